//! Parsing of playlist text into ordered segment references.

use tracing::debug;

use super::Segment;

/// Comment marker: lines starting with this are skipped.
const COMMENT_MARKER: char = '#';

/// Parses a playlist body into an ordered list of segments.
///
/// Splits the body on line boundaries, keeps lines that are non-empty and do
/// not begin with `#`, and resolves each kept line against the playlist's
/// base path (the playlist URL with its final path segment removed). The
/// relative order of kept lines is preserved, and each segment is assigned a
/// zero-based ordinal index.
///
/// A trailing `\r` is stripped from each line so CRLF playlists parse the
/// same as LF ones.
#[must_use]
pub fn parse_playlist(body: &str, playlist_url: &str) -> Vec<Segment> {
    let base = base_path(playlist_url);

    let segments: Vec<Segment> = body
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with(COMMENT_MARKER))
        .enumerate()
        .map(|(index, line)| Segment {
            index,
            url: format!("{base}/{line}"),
        })
        .collect();

    debug!(segments = segments.len(), "playlist parsed");
    segments
}

/// Returns the playlist URL with its final path segment removed.
///
/// `http://h/path/playlist.m3u8` becomes `http://h/path`. A URL without any
/// `/` is returned unchanged.
fn base_path(playlist_url: &str) -> &str {
    playlist_url
        .rsplit_once('/')
        .map_or(playlist_url, |(base, _)| base)
}
