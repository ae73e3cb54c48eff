//! Concat-list generation and external muxer invocation.
//!
//! Combination delegates the actual byte-for-byte concatenation to an
//! external `ffmpeg` process in concat-demuxer / stream-copy mode. This
//! module writes the text list the demuxer consumes and runs the process.
//!
//! # Module structure note
//!
//! This module is intentionally a single file (`mod.rs`-only); the feature
//! scope is small enough to not warrant sub-files.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Fixed name of the temporary concatenation list file.
pub const CONCAT_LIST_FILENAME: &str = "file_list.txt";

/// Default muxer binary invoked when none is configured.
pub const DEFAULT_MUXER: &str = "ffmpeg";

/// Errors produced while combining staged segments.
#[derive(Debug, Error)]
pub enum CombineError {
    /// I/O error writing the concat list file.
    #[error("IO error writing concat list {path}: {source}")]
    Io {
        /// The list file path.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The muxer binary could not be started (missing, not executable).
    #[error("failed to start muxer '{program}': {source}")]
    Spawn {
        /// The configured muxer program.
        program: String,
        /// The underlying spawn error.
        #[source]
        source: std::io::Error,
    },

    /// The muxer exited with a non-zero status.
    ///
    /// The raw diagnostic output is carried as a distinct field, not folded
    /// into a stringified message.
    #[error("muxer exited with status {exit_code}: {stderr}")]
    MuxerFailed {
        /// Exit code of the process (-1 if terminated by a signal).
        exit_code: i32,
        /// Captured standard error text from the muxer.
        stderr: String,
    },
}

/// Combines ordered segment files into a single output via an external muxer.
///
/// # Example
///
/// ```no_run
/// use stitcher_core::combine::Combiner;
/// use std::path::{Path, PathBuf};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let combiner = Combiner::new("ffmpeg");
/// let segments = vec![PathBuf::from("staging/segment_0.ts")];
/// combiner
///     .combine(&segments, Path::new("staging/file_list.txt"), Path::new("out/video.mp4"))
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Combiner {
    program: String,
}

impl Combiner {
    /// Creates a combiner invoking the given muxer program.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Returns the configured muxer program.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Writes the concat list and invokes the muxer to produce `output_path`.
    ///
    /// The muxer is invoked as:
    /// `<program> -f concat -safe 0 -i <list> -c copy <output>`
    /// with stdin detached and stderr captured. Stream copy means the
    /// segments are concatenated byte-for-byte, never re-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`CombineError`] if the list cannot be written, the muxer
    /// cannot be started, or it exits with a non-zero status.
    #[instrument(skip(self, segment_paths), fields(segments = segment_paths.len(), output = %output_path.display()))]
    pub async fn combine(
        &self,
        segment_paths: &[PathBuf],
        list_path: &Path,
        output_path: &Path,
    ) -> Result<(), CombineError> {
        write_concat_list(segment_paths, list_path).await?;
        self.run_muxer(list_path, output_path).await?;

        info!(path = %output_path.display(), "segments combined");
        Ok(())
    }

    async fn run_muxer(&self, list_path: &Path, output_path: &Path) -> Result<(), CombineError> {
        debug!(program = %self.program, "invoking muxer");

        let output = Command::new(&self.program)
            .arg("-f")
            .arg("concat")
            .arg("-safe")
            .arg("0")
            .arg("-i")
            .arg(list_path)
            .arg("-c")
            .arg("copy")
            .arg(output_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| CombineError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(CombineError::MuxerFailed {
                exit_code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(())
    }
}

/// Writes the concat demuxer list: one `file '<path>'` line per segment,
/// in the order given.
///
/// # Errors
///
/// Returns [`CombineError::Io`] if the list file cannot be written.
pub async fn write_concat_list(
    segment_paths: &[PathBuf],
    list_path: &Path,
) -> Result<(), CombineError> {
    let mut body = String::new();
    for path in segment_paths {
        body.push_str(&format!("file '{}'\n", path.display()));
    }

    tokio::fs::write(list_path, body)
        .await
        .map_err(|e| CombineError::Io {
            path: list_path.to_path_buf(),
            source: e,
        })?;

    debug!(path = %list_path.display(), entries = segment_paths.len(), "concat list written");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_concat_list_references_segments_in_order() {
        let dir = TempDir::new().unwrap();
        let list_path = dir.path().join(CONCAT_LIST_FILENAME);
        let paths: Vec<PathBuf> = (0..3)
            .map(|i| dir.path().join(format!("segment_{i}.ts")))
            .collect();

        write_concat_list(&paths, &list_path).await.unwrap();

        let body = std::fs::read_to_string(&list_path).unwrap();
        let expected = format!(
            "file '{}'\nfile '{}'\nfile '{}'\n",
            paths[0].display(),
            paths[1].display(),
            paths[2].display()
        );
        assert_eq!(body, expected);
    }

    #[tokio::test]
    async fn test_concat_list_empty_input_writes_empty_file() {
        let dir = TempDir::new().unwrap();
        let list_path = dir.path().join(CONCAT_LIST_FILENAME);

        write_concat_list(&[], &list_path).await.unwrap();

        assert_eq!(std::fs::read_to_string(&list_path).unwrap(), "");
    }

    #[tokio::test]
    async fn test_missing_muxer_binary_is_spawn_error() {
        let dir = TempDir::new().unwrap();
        let list_path = dir.path().join(CONCAT_LIST_FILENAME);
        let output_path = dir.path().join("out.mp4");

        let combiner = Combiner::new("definitely-not-a-real-muxer-binary");
        let result = combiner.combine(&[], &list_path, &output_path).await;

        assert!(matches!(result, Err(CombineError::Spawn { .. })));
    }

    #[test]
    fn test_muxer_failed_display_includes_stderr() {
        let error = CombineError::MuxerFailed {
            exit_code: 1,
            stderr: "moov atom not found".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("status 1"), "got: {msg}");
        assert!(msg.contains("moov atom not found"), "got: {msg}");
    }
}
