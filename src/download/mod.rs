//! HTTP segment download engine with streaming and retry support.

mod client;
mod engine;
mod error;
mod retry;

pub use client::HttpClient;
pub use engine::{DEFAULT_CONCURRENCY, DownloadStats, EngineError, SegmentEngine};
pub use error::DownloadError;
pub use retry::{
    DEFAULT_MAX_ATTEMPTS, FailureType, RetryDecision, RetryPolicy, classify_error,
};
