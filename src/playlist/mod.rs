//! Playlist retrieval and segment reference parsing.
//!
//! A playlist is a text document listing remote segment references, one per
//! line, with optional `#`-prefixed comment lines. This module fetches the
//! playlist body over HTTP and resolves each reference against the playlist's
//! base path, producing an ordered sequence of [`Segment`]s.

mod error;
mod fetch;
mod parse;

pub use error::PlaylistError;
pub use fetch::fetch_playlist;
pub use parse::parse_playlist;

/// File extension used for staged segment files.
pub const SEGMENT_EXTENSION: &str = "ts";

/// A single downloadable media segment.
///
/// Created during playlist parsing; the ordinal index determines both the
/// staging filename and the final concatenation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Zero-based position in the playlist.
    pub index: usize,
    /// Fully resolved retrieval URL.
    pub url: String,
}

impl Segment {
    /// Returns the deterministic staging filename for this segment,
    /// e.g. `segment_3.ts`.
    #[must_use]
    pub fn staging_filename(&self) -> String {
        format!("segment_{}.{SEGMENT_EXTENSION}", self.index)
    }

    /// Returns the full staging path for this segment under `staging_dir`.
    #[must_use]
    pub fn staging_path(&self, staging_dir: &std::path::Path) -> std::path::PathBuf {
        staging_dir.join(self.staging_filename())
    }
}
