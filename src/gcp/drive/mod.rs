mod batch;
mod client;
mod file;
mod resources;
mod resumable;

pub use file::{BatchItem, FileClient};
pub use resources::endpoint::Endpoint;
pub use resources::file::{FileList, FileMetadata, FilesListRequest, PartialFile};

/// Fixed configuration of the Drive API surface used by this crate.
pub mod config {
    /// Full read/write access to the store.
    pub const SCOPE: &str = "https://www.googleapis.com/auth/drive";
    pub const API_VERSION: &str = "v3";
    pub const DEFAULT_API_ROOT: &str = "https://www.googleapis.com";
    /// Identifier of the store root folder.
    pub const ROOT_ID: &str = "root";
    pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";
    pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
    /// Listing never follows `nextPageToken`, this is all a single call returns.
    pub const PAGE_SIZE: usize = 10;
    /// Drive rejects batches carrying more sub-requests than this.
    pub const MAX_BATCH_SIZE: usize = 100;
    /// Resumable chunks must be a multiple of this many bytes, except the last one.
    pub const CHUNK_GRANULARITY: usize = 256 * 1024;
    pub const DEFAULT_CHUNK_SIZE: usize = 32 * CHUNK_GRANULARITY;
}

pub mod credentials {

    pub mod serviceaccount {

        use crate::gcp::oauth2::token::ServiceAccountCredentials;

        pub fn from_str(
            str: &str,
            scope: &str,
        ) -> super::super::DriveResult<ServiceAccountCredentials> {
            ServiceAccountCredentials::from(str)
                .map(|x| x.with_scope(scope))
                .map_err(super::super::Error::DriveTokenError)
        }

        pub async fn from_file<T>(
            file_path: T,
            scope: &str,
        ) -> super::super::DriveResult<ServiceAccountCredentials>
        where
            T: AsRef<std::path::Path>,
        {
            ServiceAccountCredentials::from_file(file_path)
                .await
                .map(|x| x.with_scope(scope))
                .map_err(super::super::Error::DriveTokenError)
        }
    }
}

#[derive(Debug)]
pub enum Error {
    DriveTokenError(super::oauth2::Error),
    DriveHttpError(reqwest::Error),
    DriveUnexpectedResponse {
        url: String,
        status: u16,
        value: String,
    },
    DriveUnexpectedJson {
        url: String,
        expected_type: String,
        json: serde_json::Value,
    },
    DriveResourceNotFound {
        url: String,
    },
    InvalidMetadata {
        expected_type: String,
        error: serde_json::Error,
    },
    InvalidFilePath {
        path: String,
    },
    MissingLocalFile,
    IoError {
        path: String,
        error: std::io::Error,
    },
    OutputError(std::io::Error),
    UploadSessionMissingLocation {
        url: String,
    },
    UploadStalled {
        session_uri: String,
        offset: u64,
    },
    InvalidBatchResponse(String),
    BatchItemFailed {
        id: String,
        status: u16,
        body: String,
    },
    BatchItemMissing {
        id: String,
    },
    NotAFolder {
        id: String,
        mime_type: Option<String>,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl std::error::Error for Error {}

impl Error {
    fn invalid_metadata<T>(error: serde_json::Error) -> Self {
        Self::InvalidMetadata {
            expected_type: std::any::type_name::<T>().to_owned(),
            error,
        }
    }

    fn unexpected_response<T, U>(url: T, status: reqwest::StatusCode, value: U) -> Self
    where
        T: AsRef<str>,
        U: AsRef<str>,
    {
        Self::DriveUnexpectedResponse {
            url: url.as_ref().to_owned(),
            status: status.as_u16(),
            value: value.as_ref().to_owned(),
        }
    }

    fn unexpected_json<T>(url: &str, json: serde_json::Value) -> Self {
        let expected_type = std::any::type_name::<T>().to_owned();
        Self::DriveUnexpectedJson {
            url: url.to_owned(),
            expected_type,
            json,
        }
    }

    fn io_error<T>(path: T, error: std::io::Error) -> Self
    where
        T: AsRef<std::path::Path>,
    {
        Self::IoError {
            path: path.as_ref().display().to_string(),
            error,
        }
    }
}

pub type DriveResult<T> = std::result::Result<T, Error>;
