//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use stitcher_core::combine::DEFAULT_MUXER;
use stitcher_core::config::DEFAULT_OUTPUT_DIR;
use stitcher_core::{DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS};

/// Download and combine playlist video segments into a single file.
///
/// Stitcher fetches an HLS-style playlist, downloads every segment it
/// references, and concatenates them in order into one video file using an
/// external ffmpeg process.
#[derive(Parser, Debug)]
#[command(name = "stitcher")]
#[command(author, version, about)]
pub struct Args {
    /// The URL of the playlist to download
    pub url: String,

    /// The base name of the output video file (extension is added)
    pub output: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum concurrent segment downloads (1-16, 1 = sequential)
    #[arg(short = 'c', long, default_value_t = DEFAULT_CONCURRENCY as u8, value_parser = clap::value_parser!(u8).range(1..=16))]
    pub concurrency: u8,

    /// Maximum attempts per segment for transient failures (1-10)
    #[arg(short = 'r', long, default_value_t = DEFAULT_MAX_ATTEMPTS as u8, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub max_retries: u8,

    /// Directory the finished video is written to
    #[arg(short = 'o', long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Parent directory for per-run segment staging (system temp if unset)
    #[arg(long)]
    pub segment_dir: Option<PathBuf>,

    /// Muxer binary used to combine segments
    #[arg(long, default_value = DEFAULT_MUXER)]
    pub ffmpeg: String,

    /// Keep the staging directory after the run instead of removing it
    #[arg(long)]
    pub keep_segments: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_positional_url_and_output() {
        let args = Args::try_parse_from(["stitcher", "http://h/p/list.m3u8", "movie"]).unwrap();
        assert_eq!(args.url, "http://h/p/list.m3u8");
        assert_eq!(args.output, "movie");
    }

    #[test]
    fn test_cli_default_flag_values() {
        let args = Args::try_parse_from(["stitcher", "http://h/p/list.m3u8", "movie"]).unwrap();
        assert_eq!(args.verbose, 0);
        assert!(!args.quiet);
        assert_eq!(args.concurrency, 4); // DEFAULT_CONCURRENCY
        assert_eq!(args.max_retries, 5); // DEFAULT_MAX_ATTEMPTS
        assert_eq!(args.output_dir, PathBuf::from("downloaded_files"));
        assert_eq!(args.ffmpeg, "ffmpeg");
        assert!(args.segment_dir.is_none());
        assert!(!args.keep_segments);
    }

    #[test]
    fn test_cli_missing_positionals_rejected() {
        let result = Args::try_parse_from(["stitcher"]);
        assert!(result.is_err());

        let result = Args::try_parse_from(["stitcher", "http://h/p/list.m3u8"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = Args::try_parse_from(["stitcher", "u", "o", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = Args::try_parse_from(["stitcher", "u", "o", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag_sets_quiet() {
        let args = Args::try_parse_from(["stitcher", "u", "o", "-q"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_concurrency_bounds() {
        let args = Args::try_parse_from(["stitcher", "u", "o", "-c", "16"]).unwrap();
        assert_eq!(args.concurrency, 16);

        let result = Args::try_parse_from(["stitcher", "u", "o", "-c", "0"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );

        let result = Args::try_parse_from(["stitcher", "u", "o", "-c", "17"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_max_retries_bounds() {
        let args = Args::try_parse_from(["stitcher", "u", "o", "-r", "1"]).unwrap();
        assert_eq!(args.max_retries, 1);

        let result = Args::try_parse_from(["stitcher", "u", "o", "-r", "0"]);
        assert!(result.is_err());

        let result = Args::try_parse_from(["stitcher", "u", "o", "-r", "11"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_output_dir_and_ffmpeg_overrides() {
        let args = Args::try_parse_from([
            "stitcher",
            "u",
            "o",
            "-o",
            "/videos",
            "--ffmpeg",
            "/opt/ffmpeg/bin/ffmpeg",
        ])
        .unwrap();
        assert_eq!(args.output_dir, PathBuf::from("/videos"));
        assert_eq!(args.ffmpeg, "/opt/ffmpeg/bin/ffmpeg");
    }

    #[test]
    fn test_cli_keep_segments_flag() {
        let args = Args::try_parse_from(["stitcher", "u", "o", "--keep-segments"]).unwrap();
        assert!(args.keep_segments);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        // --help causes early exit, so we check it returns an error with Help kind
        let result = Args::try_parse_from(["stitcher", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = Args::try_parse_from(["stitcher", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
