use thiserror::Error;

use std::sync::Arc;

pub type Result<T> = std::result::Result<T, Error>;

/// Cloneable so one failure can be handed to every caller awaiting the same request.
#[derive(Error, Debug, Clone)]
pub enum Error {
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("Network Error: {0}")]
    NetworkError(Arc<reqwest::Error>),
    #[error("Cannot encode/decode JSON: {0}")]
    JSONError(Arc<serde_json::Error>),
    #[error("IO Error: {0}")]
    IOError(Arc<std::io::Error>),
    #[error("Cannot parse URL: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::NetworkError(Arc::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::JSONError(Arc::new(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::IOError(Arc::new(err))
    }
}

impl Error {
    /// Network failures and 5xx responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::NetworkError(_) => true,
            Self::Status { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}
