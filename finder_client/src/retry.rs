use tokio::time::Duration;
use tokio_retry::RetryIf;
use tracing::warn;

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

pub const DEFAULT_MAX_RETRIES: usize = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Errors that know whether trying again could help.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for crate::Error {
    fn is_retryable(&self) -> bool {
        crate::Error::is_retryable(self)
    }
}

/// Predicate deciding whether to retry after the given 1-based attempt failed.
pub type RetryPredicate<E> = Arc<dyn Fn(&E, usize) -> bool + Send + Sync>;

pub struct RetryOptions<E> {
    /// Retries after the first attempt; `3` means up to four calls.
    pub max_retries: usize,
    pub delay: Duration,
    pub backoff_multiplier: f64,
    pub should_retry: RetryPredicate<E>,
}

impl<E> Clone for RetryOptions<E> {
    fn clone(&self) -> Self {
        Self {
            max_retries: self.max_retries,
            delay: self.delay,
            backoff_multiplier: self.backoff_multiplier,
            should_retry: self.should_retry.clone(),
        }
    }
}

impl<E: Retryable> Default for RetryOptions<E> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY)
    }
}

impl<E: Retryable> RetryOptions<E> {
    pub fn new(max_retries: usize, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            should_retry: Arc::new(|e: &E, _| e.is_retryable()),
        }
    }
}

impl<E> RetryOptions<E> {
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_predicate(mut self, predicate: impl Fn(&E, usize) -> bool + Send + Sync + 'static) -> Self {
        self.should_retry = Arc::new(predicate);
        self
    }

    /// Wait before each retry: `delay`, `delay * multiplier`, `delay * multiplier^2`, ...
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let delay = self.delay;
        let multiplier = self.backoff_multiplier;
        (0..self.max_retries).map(move |i| delay.mul_f64(multiplier.powi(i as i32)))
    }
}

/// Run `operation` until it succeeds, the predicate declines an error, or retries run out.
/// The last error is returned as-is.
pub async fn retry_async<T, E, F, Fut>(operation: F, options: &RetryOptions<E>) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 0;
    let condition = |e: &E| {
        attempt += 1;
        if attempt > options.max_retries || !(options.should_retry)(e, attempt) {
            return false;
        }
        warn!("Attempt {} failed, retrying: {}", attempt, e);
        true
    };
    RetryIf::spawn(options.delays(), operation, condition).await
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Error;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn server_error() -> Error {
        Error::Status {
            status: 503,
            reason: "Service Unavailable".to_string(),
        }
    }

    #[test]
    fn test_backoff_delays() {
        let options = RetryOptions::<Error>::default();
        let delays: Vec<u64> = options.delays().map(|d| d.as_millis() as u64).collect();
        assert_eq!(delays, vec![1000, 2000, 4000]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_first_success() {
        let calls = &AtomicUsize::new(0);
        let result = retry_async(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(42)
            },
            &RetryOptions::default(),
        )
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_retries() {
        let calls = &AtomicUsize::new(0);
        let start = tokio::time::Instant::now();
        let result: Result<(), Error> = retry_async(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(server_error())
            },
            &RetryOptions::default(),
        )
        .await;
        assert!(matches!(result, Err(Error::Status { status: 503, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(7000) && elapsed < Duration::from_millis(7100), "{:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_failures() {
        let calls = &AtomicUsize::new(0);
        let result = retry_async(
            move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(server_error())
                } else {
                    Ok("done")
                }
            },
            &RetryOptions::new(3, Duration::from_millis(10)),
        )
        .await;
        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_stops_immediately() {
        let calls = &AtomicUsize::new(0);
        let result: Result<(), Error> = retry_async(
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(Error::Status {
                    status: 404,
                    reason: "Not Found".to_string(),
                })
            },
            &RetryOptions::default(),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_sees_attempt_numbers() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = seen.clone();
        let options = RetryOptions::<Error>::new(2, Duration::from_millis(1)).with_predicate(move |_, attempt| {
            recorded.lock().unwrap().push(attempt);
            true
        });
        let result: Result<(), Error> = retry_async(|| async { Err(Error::Cancelled) }, &options).await;
        assert!(matches!(result, Err(Error::Cancelled)));
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }
}
