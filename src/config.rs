//! Runtime configuration for a stitch run.
//!
//! Staging and output locations are explicit inputs rather than fixed
//! relative paths, so concurrent runs and tests don't trample each other.

use std::path::PathBuf;

use crate::combine::DEFAULT_MUXER;
use crate::download::{DEFAULT_CONCURRENCY, RetryPolicy};

/// Default output directory for finished videos.
pub const DEFAULT_OUTPUT_DIR: &str = "downloaded_files";

/// File extension of the final output container.
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Configuration for a single stitch run.
#[derive(Debug, Clone)]
pub struct StitchConfig {
    /// Directory the final output file is written to. Created if missing.
    pub output_dir: PathBuf,

    /// Parent directory for the per-run staging directory. `None` uses the
    /// system temp directory. The staging directory itself is always a fresh
    /// per-run temporary directory.
    pub segment_dir: Option<PathBuf>,

    /// Muxer program invoked for combination (name or path).
    pub ffmpeg: String,

    /// Segment download pool size (1 reproduces sequential behavior).
    pub concurrency: usize,

    /// Retry policy applied to each segment download.
    pub retry_policy: RetryPolicy,

    /// Keep the staging directory after the run instead of removing it.
    pub keep_segments: bool,

    /// Show a progress bar during the download phase.
    pub show_progress: bool,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            segment_dir: None,
            ffmpeg: DEFAULT_MUXER.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            retry_policy: RetryPolicy::default(),
            keep_segments: false,
            show_progress: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = StitchConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("downloaded_files"));
        assert_eq!(config.ffmpeg, "ffmpeg");
        assert_eq!(config.concurrency, DEFAULT_CONCURRENCY);
        assert!(config.segment_dir.is_none());
        assert!(!config.keep_segments);
        assert!(config.show_progress);
    }
}
