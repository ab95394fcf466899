use std::future::Future;
use std::result::Result;

use tokio::time::Duration;

use crate::error::{AppError, ServerError};

pub fn timeout<T, E: Into<ServerError>>(
    duration: Duration,
    f: impl Future<Output = Result<T, E>>,
) -> impl Future<Output = Result<T, ServerError>> {
    use futures::FutureExt;
    tokio::time::timeout(duration, f).map(move |result| {
        result
            .map(|r| r.map_err(Into::into))
            .unwrap_or_else(|_| Err(AppError::Timeout(format!("after {} ms", duration.as_millis())).into()))
    })
}
