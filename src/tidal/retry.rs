use std::{future::Future, time::Duration};

use tokio::time::sleep;

use super::error::{Result, TidalError};

/// Configuration for retrying transient remote failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Longest `Retry-After` we are willing to wait, in seconds.
    pub max_retry_after: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_retry_after: 120,
        }
    }
}

impl RetryConfig {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Runs `operation` until it succeeds, fails permanently or runs out of retries.
///
/// Only [`TidalError::is_transient`] errors are retried. The wait before retry
/// `n` is `base_delay * 2^n`, or the server's `Retry-After` when that is longer.
/// A `Retry-After` above `max_retry_after` is returned to the caller as is.
pub async fn with_retry<T, F, Fut>(config: &RetryConfig, operation_name: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries = 0;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() => err,
            Err(err) => return Err(err),
        };

        if retries >= config.max_retries {
            log::warn!(
                "Max retries ({}) exceeded for {}: {}",
                config.max_retries,
                operation_name,
                err
            );
            return Err(err);
        }

        let backoff = config.base_delay * 2_u32.pow(retries);
        let delay = match err {
            TidalError::RateLimited { retry_after } => {
                if retry_after > config.max_retry_after {
                    return Err(err);
                }
                backoff.max(Duration::from_secs(retry_after))
            }
            _ => backoff,
        };

        log::warn!(
            "{} failed ({}). Waiting {:?} before retry {} of {}",
            operation_name,
            err,
            delay,
            retries + 1,
            config.max_retries
        );

        sleep(delay).await;
        retries += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use reqwest::StatusCode;

    use super::*;

    fn quick() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            base_delay: Duration::ZERO,
            max_retry_after: 0,
        }
    }

    fn bad_gateway() -> TidalError {
        TidalError::Status {
            status: StatusCode::BAD_GATEWAY,
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn transient_failures_are_retried_until_success() {
        let calls = Cell::new(0);
        let result = with_retry(&quick(), "search", || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err(bad_gateway())
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(&quick(), "add", || {
            calls.set(calls.get() + 1);
            async { Err(bad_gateway()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(&quick(), "remove", || {
            calls.set(calls.get() + 1);
            async { Err(TidalError::Auth("expired".into())) }
        })
        .await;

        assert!(matches!(result, Err(TidalError::Auth(_))));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn excessive_retry_after_is_returned_immediately() {
        let calls = Cell::new(0);
        let result: Result<()> = with_retry(&quick(), "search", || {
            calls.set(calls.get() + 1);
            async { Err(TidalError::RateLimited { retry_after: 600 }) }
        })
        .await;

        assert!(matches!(result, Err(TidalError::RateLimited { retry_after: 600 })));
        assert_eq!(calls.get(), 1);
    }
}
