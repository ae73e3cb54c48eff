//! End-to-end orchestration of a stitch run.
//!
//! Sequences: ensure output directory → create per-run staging directory →
//! fetch and parse the playlist → download all segments → combine into the
//! output file → report. Any component failure aborts the remaining
//! sequence.
//!
//! The staging directory (segments plus the concat list) is a per-run
//! temporary directory removed on every exit path, success or failure,
//! unless the run is configured to keep it.

use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use tempfile::TempDir;
use thiserror::Error;
use tracing::{info, instrument};

use crate::combine::{CONCAT_LIST_FILENAME, CombineError, Combiner};
use crate::config::{OUTPUT_EXTENSION, StitchConfig};
use crate::download::{EngineError, HttpClient, SegmentEngine};
use crate::playlist::{PlaylistError, fetch_playlist, parse_playlist};

/// Errors that can abort a stitch run.
#[derive(Debug, Error)]
pub enum RunError {
    /// The playlist could not be fetched.
    #[error(transparent)]
    Playlist(#[from] PlaylistError),

    /// The playlist contained no segment references.
    #[error("playlist {url} contains no segments")]
    EmptyPlaylist {
        /// The playlist URL.
        url: String,
    },

    /// A segment download failed terminally.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The combination step failed.
    #[error(transparent)]
    Combine(#[from] CombineError),

    /// Filesystem error preparing run directories.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Path of the final output file.
    pub output_path: PathBuf,
    /// Number of segments downloaded and combined.
    pub segments: usize,
    /// Total retry attempts made across all segments.
    pub retried: usize,
}

/// Runs the full pipeline: fetch playlist, download segments, combine.
///
/// The output file lands at `<output_dir>/<output_name>.mp4` and is never
/// mutated afterwards.
///
/// # Errors
///
/// Returns [`RunError`] on the first failing step; nothing downstream of the
/// failure is attempted, and the staging directory is removed regardless.
#[instrument(skip(config), fields(url = %playlist_url, output = %output_name))]
pub async fn run(
    config: &StitchConfig,
    playlist_url: &str,
    output_name: &str,
) -> Result<RunReport, RunError> {
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .map_err(|e| RunError::io(&config.output_dir, e))?;

    let staging = create_staging_dir(config.segment_dir.as_deref())?;

    let client = HttpClient::new();

    info!("fetching playlist");
    let body = fetch_playlist(&client, playlist_url).await?;
    let segments = parse_playlist(&body, playlist_url);
    if segments.is_empty() {
        return Err(RunError::EmptyPlaylist {
            url: playlist_url.to_string(),
        });
    }

    info!(segments = segments.len(), "downloading segments");
    let progress = if config.show_progress {
        download_progress_bar(segments.len() as u64)
    } else {
        ProgressBar::hidden()
    };

    let engine = SegmentEngine::new(config.concurrency, config.retry_policy.clone())?;
    let stats = engine
        .download_all(&client, &segments, staging.path(), &progress)
        .await?;
    progress.finish_and_clear();

    let staged_paths: Vec<PathBuf> = segments
        .iter()
        .map(|s| s.staging_path(staging.path()))
        .collect();
    let list_path = staging.path().join(CONCAT_LIST_FILENAME);
    let output_path = config
        .output_dir
        .join(format!("{output_name}.{OUTPUT_EXTENSION}"));

    info!("combining segments");
    let combiner = Combiner::new(config.ffmpeg.clone());
    combiner
        .combine(&staged_paths, &list_path, &output_path)
        .await?;

    if config.keep_segments {
        let kept = staging.keep();
        info!(path = %kept.display(), "staging directory kept");
    }
    // Otherwise `staging` drops here, removing the segment files and the
    // concat list.

    Ok(RunReport {
        output_path,
        segments: stats.completed(),
        retried: stats.retried(),
    })
}

/// Creates the per-run staging directory.
///
/// With a configured parent, the parent is created first and the staging
/// directory nests inside it; otherwise the system temp directory is used.
fn create_staging_dir(parent: Option<&Path>) -> Result<TempDir, RunError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("stitcher-");

    match parent {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(|e| RunError::io(parent, e))?;
            builder
                .tempdir_in(parent)
                .map_err(|e| RunError::io(parent, e))
        }
        None => builder
            .tempdir()
            .map_err(|e| RunError::io(std::env::temp_dir(), e)),
    }
}

fn download_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} segments")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
