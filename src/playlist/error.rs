//! Error types for playlist retrieval.

use thiserror::Error;

/// Errors that can occur while fetching a playlist.
///
/// Playlist fetch failures are fatal immediately - no retry happens at this
/// layer.
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// Network-level error (DNS resolution, connection refused, TLS, etc.)
    #[error("network error fetching playlist {url}: {source}")]
    Network {
        /// The playlist URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before the playlist body arrived.
    #[error("timeout fetching playlist {url}")]
    Timeout {
        /// The playlist URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching playlist {url}")]
    HttpStatus {
        /// The playlist URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The provided playlist URL is malformed or invalid.
    #[error("invalid playlist URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl PlaylistError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_playlist_error_http_status_display() {
        let error = PlaylistError::http_status("http://host/playlist.m3u8", 404);
        let msg = error.to_string();
        assert!(msg.contains("404"), "Expected '404' in: {msg}");
        assert!(msg.contains("playlist.m3u8"), "Expected URL in: {msg}");
    }

    #[test]
    fn test_playlist_error_timeout_display() {
        let error = PlaylistError::timeout("http://host/playlist.m3u8");
        assert!(error.to_string().contains("timeout"));
    }

    #[test]
    fn test_playlist_error_invalid_url_display() {
        let error = PlaylistError::invalid_url("not-a-url");
        let msg = error.to_string();
        assert!(msg.contains("invalid playlist URL"), "got: {msg}");
        assert!(msg.contains("not-a-url"), "got: {msg}");
    }
}
