use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Failures raised by the server itself rather than a library.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Missing query parameter: {0}")]
    MissingParameter(&'static str),
}

#[derive(Debug)]
pub struct ServerError(anyhow::Error);

impl<E> From<E> for ServerError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!("{}", self);
        let status = self.status_code();
        (status, self.to_string()).into_response()
    }
}

impl ServerError {
    fn status_code(&self) -> StatusCode {
        let err = &self.0;
        for cause in err.chain() {
            if let Some(err) = cause.downcast_ref::<finder_client::Error>() {
                match err {
                    finder_client::Error::Status { .. } => return StatusCode::BAD_GATEWAY,
                    finder_client::Error::NetworkError(_) => return StatusCode::BAD_GATEWAY,
                    finder_client::Error::JSONError(_) => return StatusCode::BAD_GATEWAY,
                    finder_client::Error::Cancelled => return StatusCode::GATEWAY_TIMEOUT,
                    _ => return StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
            if cause.downcast_ref::<finder_core::Error>().is_some() {
                return StatusCode::BAD_REQUEST;
            }
            if let Some(err) = cause.downcast_ref::<AppError>() {
                match err {
                    AppError::Timeout(_) => return StatusCode::GATEWAY_TIMEOUT,
                    AppError::MissingParameter(_) => return StatusCode::BAD_REQUEST,
                }
            }
            if let Some(err) = cause.downcast_ref::<std::io::Error>() {
                if err.kind() == std::io::ErrorKind::NotFound {
                    return StatusCode::NOT_FOUND;
                }
            }
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}
