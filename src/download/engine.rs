//! Download engine for fetching playlist segments with retry support.
//!
//! This module provides the `SegmentEngine` which downloads segments using a
//! semaphore-bounded pool of Tokio tasks, with automatic retry on transient
//! failures using exponential backoff.
//!
//! Segments are independent, so they may download out of order; each one
//! writes to its own ordinal-indexed staging file and assembly happens
//! strictly by index afterwards, which preserves the ordering contract
//! (output order equals playlist order) regardless of completion order.
//!
//! # Example
//!
//! ```no_run
//! use stitcher_core::download::{HttpClient, RetryPolicy, SegmentEngine};
//! use stitcher_core::playlist::Segment;
//! use indicatif::ProgressBar;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let segments = vec![Segment { index: 0, url: "http://h/seg0.ts".into() }];
//! let engine = SegmentEngine::new(4, RetryPolicy::default())?;
//! let client = HttpClient::new();
//! let progress = ProgressBar::hidden();
//! let stats = engine
//!     .download_all(&client, &segments, Path::new("./staging"), &progress)
//!     .await?;
//! println!("Downloaded {} segments", stats.completed());
//! # Ok(())
//! # }
//! ```

use std::path::Path;
use std::sync::Arc;

use indicatif::ProgressBar;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use super::retry::{RetryDecision, RetryPolicy, classify_error};
use super::{DownloadError, HttpClient};
use crate::playlist::Segment;

/// Minimum allowed pool size.
const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed pool size.
const MAX_CONCURRENCY: usize = 16;

/// Default pool size if not specified. A pool of 1 downloads segments
/// strictly sequentially.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Error type for segment engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// A segment exhausted its retries (or failed permanently).
    ///
    /// This aborts the whole run; segments are never silently skipped.
    #[error("segment {index} failed after {attempts} attempt(s): {source}")]
    SegmentFailed {
        /// Zero-based index of the failed segment.
        index: usize,
        /// Number of attempts made, including the initial one.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        source: DownloadError,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,

    /// A download task panicked or was cancelled.
    #[error("download task aborted unexpectedly")]
    TaskAborted,
}

/// Statistics from a segment download run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DownloadStats {
    completed: usize,
    retried: usize,
}

impl DownloadStats {
    /// Returns the number of successfully downloaded segments.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Returns the total number of retry attempts made across all segments.
    #[must_use]
    pub fn retried(&self) -> usize {
        self.retried
    }
}

/// Engine downloading playlist segments through a bounded worker pool.
///
/// # Concurrency Model
///
/// - Each segment download runs in its own Tokio task
/// - A semaphore permit is acquired before the request starts
/// - Permits are released automatically when downloads complete (RAII)
/// - The first terminal failure aborts the run; outstanding tasks are
///   cancelled when the join set is dropped
///
/// # Retry Behavior
///
/// - Transport errors (connection failures, timeouts, non-success statuses)
///   are retried per segment with exponential backoff
/// - Filesystem errors fail immediately without retry
/// - A segment that exhausts its attempts fails the whole run
#[derive(Debug)]
pub struct SegmentEngine {
    /// Semaphore for concurrency control.
    semaphore: Arc<Semaphore>,
    /// Configured pool size.
    concurrency: usize,
    /// Retry policy applied to each segment.
    retry_policy: RetryPolicy,
}

impl SegmentEngine {
    /// Creates a new engine with the specified pool size and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-16).
    pub fn new(concurrency: usize, retry_policy: RetryPolicy) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            retry_policy,
        })
    }

    /// Returns the configured pool size.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Downloads every segment into its staging file under `staging_dir`.
    ///
    /// Files are named `segment_<index>.ts` so the caller can assemble them
    /// strictly by index. The progress bar is advanced once per completed
    /// segment; pass [`ProgressBar::hidden`] to disable output.
    ///
    /// # Errors
    ///
    /// Returns the first [`EngineError::SegmentFailed`] encountered; any
    /// still-running downloads are cancelled.
    #[instrument(skip_all, fields(segments = segments.len(), concurrency = self.concurrency))]
    pub async fn download_all(
        &self,
        client: &HttpClient,
        segments: &[Segment],
        staging_dir: &Path,
        progress: &ProgressBar,
    ) -> Result<DownloadStats, EngineError> {
        let mut tasks: JoinSet<Result<(usize, u32), EngineError>> = JoinSet::new();

        for segment in segments {
            let semaphore = Arc::clone(&self.semaphore);
            let client = client.clone();
            let segment = segment.clone();
            let dest = segment.staging_path(staging_dir);
            let policy = self.retry_policy.clone();

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| EngineError::SemaphoreClosed)?;
                let retries = download_with_retry(&client, &segment, &dest, &policy).await?;
                Ok((segment.index, retries))
            });
        }

        let mut stats = DownloadStats::default();
        while let Some(joined) = tasks.join_next().await {
            let (index, retries) = joined.map_err(|_| EngineError::TaskAborted)??;
            stats.completed += 1;
            stats.retried += retries as usize;
            progress.inc(1);
            debug!(index, retries, "segment staged");
        }

        info!(
            completed = stats.completed,
            retried = stats.retried,
            "all segments downloaded"
        );
        Ok(stats)
    }
}

/// Downloads one segment, retrying transient failures per the policy.
///
/// Returns the number of retries performed on success.
async fn download_with_retry(
    client: &HttpClient,
    segment: &Segment,
    dest: &Path,
    policy: &RetryPolicy,
) -> Result<u32, EngineError> {
    let mut attempt: u32 = 1;
    let mut retries: u32 = 0;

    loop {
        match client.download_to_path(&segment.url, dest).await {
            Ok(_) => return Ok(retries),
            Err(error) => {
                let failure_type = classify_error(&error);
                match policy.should_retry(failure_type, attempt) {
                    RetryDecision::Retry {
                        delay,
                        attempt: next_attempt,
                    } => {
                        warn!(
                            index = segment.index,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %error,
                            "segment download failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt = next_attempt;
                        retries += 1;
                    }
                    RetryDecision::DoNotRetry { reason } => {
                        warn!(index = segment.index, attempt, reason, "giving up on segment");
                        return Err(EngineError::SegmentFailed {
                            index: segment.index,
                            attempts: attempt,
                            source: error,
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_accepts_valid_concurrency_range() {
        for value in [1, 4, 16] {
            let engine = SegmentEngine::new(value, RetryPolicy::default());
            assert!(engine.is_ok(), "concurrency {value} should be accepted");
            assert_eq!(engine.unwrap().concurrency(), value);
        }
    }

    #[test]
    fn test_engine_rejects_zero_concurrency() {
        let result = SegmentEngine::new(0, RetryPolicy::default());
        assert!(matches!(
            result,
            Err(EngineError::InvalidConcurrency { value: 0 })
        ));
    }

    #[test]
    fn test_engine_rejects_oversized_concurrency() {
        let result = SegmentEngine::new(17, RetryPolicy::default());
        assert!(matches!(
            result,
            Err(EngineError::InvalidConcurrency { value: 17 })
        ));
    }

    #[test]
    fn test_stats_default_is_zero() {
        let stats = DownloadStats::default();
        assert_eq!(stats.completed(), 0);
        assert_eq!(stats.retried(), 0);
    }

    #[test]
    fn test_segment_failed_display_names_index_and_attempts() {
        let error = EngineError::SegmentFailed {
            index: 3,
            attempts: 5,
            source: DownloadError::http_status("http://h/segment_3.ts", 503),
        };
        let msg = error.to_string();
        assert!(msg.contains("segment 3"), "got: {msg}");
        assert!(msg.contains("5 attempt"), "got: {msg}");
    }
}
