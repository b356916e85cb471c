//! Retry-aware resource fetching with an optional file cache.

use bytes::Bytes;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::decompress::decompress_bi5;
use crate::transport::{Transport, TransportError};
use crate::url::cache_key;

/// Delay policy between retry attempts.
#[derive(Clone)]
pub enum RetryDelay {
    /// The same delay before every retry.
    Fixed(Duration),
    /// Caller-supplied policy mapping the attempt number (0-based) to a
    /// delay.
    Custom(Arc<dyn Fn(u32) -> Duration + Send + Sync>),
}

impl RetryDelay {
    /// Wraps a delay function.
    pub fn custom(f: impl Fn(u32) -> Duration + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(f))
    }

    /// The default exponential policy: 200 ms doubled per attempt
    /// (200, 400, 800, 1600, ...).
    #[must_use]
    pub fn exponential() -> Self {
        Self::custom(|attempt| {
            Duration::from_millis(200u64.saturating_mul(1u64 << attempt.min(32)))
        })
    }

    /// Returns the delay before the retry following failed attempt
    /// `attempt` (starting at 0).
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Fixed(delay) => *delay,
            Self::Custom(f) => f(attempt),
        }
    }
}

impl Default for RetryDelay {
    fn default() -> Self {
        Self::exponential()
    }
}

impl std::fmt::Debug for RetryDelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(delay) => f.debug_tuple("Fixed").field(delay).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Retry and cache behaviour for a fetcher.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay policy between attempts.
    pub retry_delay: RetryDelay,
    /// Whether an empty 200 body is retried instead of accepted.
    pub retry_on_empty: bool,
    /// Whether exhausting retries is an error; otherwise the resource is
    /// treated as empty.
    pub fail_after_retries: bool,
    /// Directory for the decompressed-bytes cache; `None` disables
    /// caching.
    pub cache_dir: Option<PathBuf>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: RetryDelay::default(),
            retry_on_empty: false,
            fail_after_retries: false,
            cache_dir: None,
        }
    }
}

/// Errors that can occur while fetching a single resource.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Every attempt failed and `fail_after_retries` is set.
    #[error("retries exhausted after {attempts} attempts: {cause}")]
    RetryExhausted {
        /// Total attempts made.
        attempts: u32,
        /// The last failure.
        cause: Box<FetchError>,
    },

    /// The server returned an unexpected status.
    #[error("server returned status {0}")]
    HttpStatus(u16),

    /// Transport-level failure (timeout, connect, ...).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body could not be decompressed.
    #[error("decompression failed: {0}")]
    Decompress(String),

    /// The server returned an empty 200 body and `retry_on_empty` is set.
    #[error("empty response body")]
    EmptyBody,
}

/// Downloads single resources: cache read-through, bounded retries with a
/// configurable delay, LZMA decompression, cache write-through.
///
/// The output is always raw decompressed bytes; a missing remote period
/// (404) is an empty byte string, not an error.
#[derive(Debug, Clone)]
pub struct Fetcher {
    transport: Arc<dyn Transport>,
    policy: FetchPolicy,
}

impl Fetcher {
    /// Creates a fetcher over the given transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, policy: FetchPolicy) -> Self {
        Self { transport, policy }
    }

    /// Returns the fetch policy.
    #[must_use]
    pub const fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    /// Fetches one resource, returning its decompressed bytes.
    ///
    /// # Errors
    ///
    /// Returns an error only when retries are exhausted and the policy has
    /// `fail_after_retries` set.
    pub async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        if let Some(dir) = &self.policy.cache_dir {
            if let Some(bytes) = read_cache(dir, url).await {
                tracing::debug!(url, "cache hit");
                return Ok(bytes);
            }
        }

        let mut failures = 0u32;
        loop {
            match self.attempt(url).await {
                Ok(bytes) => {
                    if !bytes.is_empty() {
                        if let Some(dir) = &self.policy.cache_dir {
                            write_cache(dir.clone(), url, bytes.clone()).await;
                        }
                    }
                    return Ok(bytes);
                }
                Err(cause) if failures >= self.policy.max_retries => {
                    if self.policy.fail_after_retries {
                        return Err(FetchError::RetryExhausted {
                            attempts: failures + 1,
                            cause: Box::new(cause),
                        });
                    }
                    tracing::warn!(url, error = %cause, "retries exhausted, treating resource as empty");
                    return Ok(Bytes::new());
                }
                Err(cause) => {
                    let delay = self.policy.retry_delay.delay(failures);
                    tracing::warn!(url, attempt = failures, error = %cause, "retrying fetch");
                    tokio::time::sleep(delay).await;
                    failures += 1;
                }
            }
        }
    }

    /// One network attempt. Every `Err` is retryable by definition.
    async fn attempt(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self.transport.get(url).await?;
        match response.status {
            // The remote publishes missing periods as 404: a data gap, not
            // an error.
            404 => Ok(Bytes::new()),
            200 if response.body.is_empty() => {
                if self.policy.retry_on_empty {
                    Err(FetchError::EmptyBody)
                } else {
                    Ok(Bytes::new())
                }
            }
            200 => {
                let body = response.body;
                let decompressed = tokio::task::spawn_blocking(move || decompress_bi5(&body))
                    .await
                    .map_err(|e| FetchError::Decompress(format!("spawn_blocking failed: {e}")))?
                    .map_err(|e| FetchError::Decompress(e.to_string()))?;
                Ok(decompressed.into())
            }
            status => Err(FetchError::HttpStatus(status)),
        }
    }
}

/// Reads cached bytes for a URL. Any miss or I/O failure is a miss.
async fn read_cache(dir: &Path, url: &str) -> Option<Bytes> {
    let path = dir.join(cache_key(url));
    tokio::fs::read(&path).await.ok().map(Bytes::from)
}

/// Writes bytes to the cache, atomically via a temp file and rename.
///
/// Concurrent writers for the same key are benign: last writer wins and
/// readers never observe a partial file. Failures are logged and ignored;
/// the cache is an optimization, not a source of truth.
async fn write_cache(dir: PathBuf, url: &str, bytes: Bytes) {
    let path = dir.join(cache_key(url));
    let result = tokio::task::spawn_blocking(move || -> std::io::Result<()> {
        std::fs::create_dir_all(&dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(url, error = %e, "cache write failed"),
        Err(e) => tracing::warn!(url, error = %e, "cache write task failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_delay_doubles() {
        let delay = RetryDelay::default();
        assert_eq!(delay.delay(0), Duration::from_millis(200));
        assert_eq!(delay.delay(1), Duration::from_millis(400));
        assert_eq!(delay.delay(2), Duration::from_millis(800));
        assert_eq!(delay.delay(3), Duration::from_millis(1600));
    }

    #[test]
    fn test_fixed_retry_delay() {
        let delay = RetryDelay::Fixed(Duration::from_millis(50));
        assert_eq!(delay.delay(0), Duration::from_millis(50));
        assert_eq!(delay.delay(9), Duration::from_millis(50));
    }

    #[test]
    fn test_custom_retry_delay() {
        let delay = RetryDelay::custom(|attempt| Duration::from_millis(u64::from(attempt) * 10));
        assert_eq!(delay.delay(0), Duration::ZERO);
        assert_eq!(delay.delay(5), Duration::from_millis(50));
    }

    #[test]
    fn test_policy_default() {
        let policy = FetchPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert!(!policy.retry_on_empty);
        assert!(!policy.fail_after_retries);
        assert!(policy.cache_dir.is_none());
    }
}
