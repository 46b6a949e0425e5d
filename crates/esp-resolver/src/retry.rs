// SPDX-License-Identifier: MIT OR Apache-2.0
//! Retry/backoff for transient HTTPS fetch failures (`spec.md` §4.4).

use esp_error::PackageLoadError;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for retry behavior when fetching a package metadata
/// document or zip archive.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the initial attempt.
    pub max_retries: u32,
    /// Base delay for exponential backoff.
    pub base_delay: Duration,
    /// Maximum delay cap for exponential backoff.
    pub max_delay: Duration,
    /// Overall wall-clock timeout across all attempts.
    pub overall_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            overall_timeout: Duration::from_secs(30),
        }
    }
}

/// Returns `true` if the error is eligible for retry: transport-level I/O
/// faults and non-2xx status codes are transient; integrity and shape
/// faults are not.
#[must_use]
pub fn is_retryable(err: &PackageLoadError) -> bool {
    matches!(
        err,
        PackageLoadError::IoErrorMakingHttpGet { .. } | PackageLoadError::BadHttpStatusCode { .. }
    )
}

/// Generic retry loop with exponential backoff (no jitter source is
/// available outside `std`'s clock without pulling in a PRNG dependency the
/// teacher's stack doesn't already carry, so this backs off deterministically).
pub async fn retry_async<T, F, Fut>(
    config: &RetryConfig,
    mut op: F,
) -> Result<T, PackageLoadError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PackageLoadError>>,
{
    let start = Instant::now();
    let max_attempts = config.max_retries + 1;

    for attempt in 0..max_attempts {
        if start.elapsed() >= config.overall_timeout {
            warn!(target: "esp_resolver::retry", attempt, "overall timeout exceeded");
            break;
        }

        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                let is_last = attempt + 1 >= max_attempts;
                if !is_retryable(&err) || is_last {
                    if is_last && is_retryable(&err) {
                        warn!(target: "esp_resolver::retry", error = %err, attempt, "retries exhausted");
                    }
                    return Err(err);
                }

                let delay = compute_delay(config, attempt);
                debug!(target: "esp_resolver::retry", error = %err, attempt, delay_ms = delay.as_millis() as u64, "retrying after transient fetch failure");

                let remaining = config.overall_timeout.saturating_sub(start.elapsed());
                if delay > remaining {
                    return Err(err);
                }
                tokio::time::sleep(delay).await;
            }
        }
    }

    op().await
}

fn compute_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let exp = 2u64.saturating_pow(attempt);
    let delay_ms = (config.base_delay.as_millis() as u64).saturating_mul(exp);
    Duration::from_millis(delay_ms.min(config.max_delay.as_millis() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_a_retryable_error_until_success() {
        let attempts = AtomicU32::new(0);
        let config = RetryConfig {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            overall_timeout: Duration::from_secs(5),
        };
        let result = retry_async(&config, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(PackageLoadError::BadHttpStatusCode {
                        url: "https://example.com".into(),
                        status: 503,
                    })
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_fast() {
        let attempts = AtomicU32::new(0);
        let config = RetryConfig::default();
        let result: Result<(), _> = retry_async(&config, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                Err(PackageLoadError::InvalidPackageZipUrl {
                    url: "http://example.com".into(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
