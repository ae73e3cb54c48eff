//! HTTP retrieval of the playlist body.

use tracing::{debug, instrument};
use url::Url;

use super::PlaylistError;
use crate::download::HttpClient;

/// Fetches the playlist body as text.
///
/// Failures here are fatal to the run; the retry policy applies only to
/// segment downloads, never to the playlist itself.
///
/// # Errors
///
/// Returns [`PlaylistError`] if the URL is invalid, the request fails
/// (network error, timeout), or the server responds with a non-success
/// status.
#[instrument(skip(client), fields(url = %url))]
pub async fn fetch_playlist(client: &HttpClient, url: &str) -> Result<String, PlaylistError> {
    Url::parse(url).map_err(|_| PlaylistError::invalid_url(url))?;

    let response = client.inner().get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            PlaylistError::timeout(url)
        } else {
            PlaylistError::network(url, e)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(PlaylistError::http_status(url, status.as_u16()));
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            PlaylistError::timeout(url)
        } else {
            PlaylistError::network(url, e)
        }
    })?;

    debug!(bytes = body.len(), "playlist fetched");
    Ok(body)
}
