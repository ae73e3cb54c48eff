//! CLI entry point for the stitcher tool.

use std::io::IsTerminal;

use anyhow::Result;
use clap::Parser;
use stitcher_core::{RetryPolicy, StitchConfig, pipeline};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    debug!(?args, "CLI arguments parsed");
    info!("Stitcher starting");

    let config = StitchConfig {
        output_dir: args.output_dir,
        segment_dir: args.segment_dir,
        ffmpeg: args.ffmpeg,
        concurrency: usize::from(args.concurrency),
        retry_policy: RetryPolicy::with_max_attempts(u32::from(args.max_retries)),
        keep_segments: args.keep_segments,
        show_progress: !args.quiet && std::io::stderr().is_terminal(),
    };

    let report = pipeline::run(&config, &args.url, &args.output).await?;

    info!(
        segments = report.segments,
        retried = report.retried,
        "Stitch complete"
    );
    println!("Video has been saved as {}", report.output_path.display());

    Ok(())
}
