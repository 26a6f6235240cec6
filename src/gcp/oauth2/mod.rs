pub mod token;

#[derive(Debug)]
pub enum Error {
    DeserializationError {
        expected_type: String,
        error: serde_json::Error,
    },
    IoError {
        message: String,
        path: String,
        error: std::io::Error,
    },
    HttpError(reqwest::Error),
    JWTError(jsonwebtoken::errors::Error),
    MissingScope,
    UnexpectedApiResponse(serde_json::Value),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl std::error::Error for Error {}

impl Error {
    pub fn io_error<T>(message: &str, path: T, error: std::io::Error) -> Error
    where
        T: AsRef<std::path::Path>,
    {
        Error::IoError {
            message: message.to_owned(),
            path: path.as_ref().display().to_string(),
            error,
        }
    }

    pub fn deserialization_error<T>(error: serde_json::Error) -> Error {
        let expected_type = std::any::type_name::<T>().to_owned();
        Error::DeserializationError {
            expected_type,
            error,
        }
    }
}

type TokenResult<T> = std::result::Result<T, Error>;
