use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

use crate::drive::config::{API_VERSION, DEFAULT_API_ROOT};

// RFC 3986 unreserved characters stay as they are, Drive ids use '-' and '_'
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn percent_encode(input: &str) -> String {
    percent_encoding::utf8_percent_encode(input, PATH_SEGMENT).to_string()
}

/// Root of the Drive REST API, `https://www.googleapis.com` unless pointed at an emulator.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Endpoint {
    api_root: String,
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_API_ROOT)
    }
}

impl Endpoint {
    pub fn new(api_root: &str) -> Self {
        Self {
            api_root: api_root.trim_end_matches('/').to_owned(),
        }
    }

    pub fn api_root(&self) -> &str {
        self.api_root.as_str()
    }

    /// Path of the files collection, also used as request line inside batches.
    pub fn files_path(&self) -> String {
        format!("/drive/{}/files", API_VERSION)
    }

    pub fn file_path(&self, id: &str) -> String {
        format!("{}/{}", self.files_path(), percent_encode(id))
    }

    pub fn files_url(&self) -> String {
        format!("{}{}", self.api_root, self.files_path())
    }

    pub fn file_url(&self, id: &str) -> String {
        format!("{}{}", self.api_root, self.file_path(id))
    }

    pub fn upload_url(&self, upload_type: &str) -> String {
        format!(
            "{}/upload/drive/{}/files?uploadType={}",
            self.api_root, API_VERSION, upload_type
        )
    }

    pub fn batch_url(&self) -> String {
        format!("{}/batch/drive/{}", self.api_root, API_VERSION)
    }
}
