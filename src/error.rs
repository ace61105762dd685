use reqwest::StatusCode;
use thiserror::Error;

/// A request that did not complete with a success status.
///
/// A transport failure (dns, connection refused, timeout) carries no status.
/// The dashboard treats both the same way, the status is only kept for logs
/// and tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{}", status_prefix(.status), .message)]
pub struct ApiError {
    pub status: Option<StatusCode>,
    pub message: String,
}

impl ApiError {
    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    /// Builds an error out of a failed response body. The backend answers
    /// failures with `{"error": "..."}`, anything else is kept verbatim.
    pub(crate) fn from_body(status: StatusCode, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            error: Option<String>,
            message: Option<String>,
        }

        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                error: Some(msg), ..
            })
            | Ok(ErrorBody {
                message: Some(msg),
                ..
            }) => msg,
            _ if body.trim().is_empty() => status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string(),
            _ => body.trim().to_string(),
        };

        Self::status(status, message)
    }
}

fn status_prefix(status: &Option<StatusCode>) -> String {
    match status {
        Some(status) => format!("{} - ", status),
        None => String::new(),
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::status(status, err.to_string()),
            None => Self::transport(err.to_string()),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("api request failed: {0}")]
    Api(#[from] ApiError),

    /// the call succeeded but the body did not have the expected shape
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("upload failed: {0}")]
    Upload(#[source] Box<Error>),

    #[error("delete failed: {0}")]
    Delete(#[source] Box<Error>),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    IO(#[from] std::io::Error),
}

impl Error {
    /// The api error behind this error, if any, looking through the
    /// upload and delete wrappers.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            Error::Upload(inner) | Error::Delete(inner) => inner.api(),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        match self {
            Error::MalformedResponse(_) => true,
            Error::Upload(inner) | Error::Delete(inner) => inner.is_malformed(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
