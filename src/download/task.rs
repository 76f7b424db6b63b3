//! Avatar fetch and persistence primitives.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;

use super::error::DownloadError;

/// Total timeout for one avatar fetch. No retry on expiry.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client for avatar fetches.
///
/// Created once and cloned into each download task, taking advantage
/// of reqwest's connection pooling.
#[derive(Debug, Clone)]
pub struct AvatarClient {
    client: Client,
}

impl Default for AvatarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AvatarClient {
    /// Creates a client with the fixed fetch timeout.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches the avatar payload at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Network`] / [`DownloadError::Timeout`]
    /// on transport failure and [`DownloadError::HttpStatus`] on a
    /// non-success response.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(url, e))?;
        Ok(bytes.to_vec())
    }
}

/// Sniffs the payload format and returns the file extension to use.
///
/// Returns `None` when the payload is not a recognized image (including
/// recognized non-image formats like archives). `jpeg` is normalized to
/// `jpg`.
#[must_use]
pub fn image_extension(payload: &[u8]) -> Option<&'static str> {
    let kind = infer::get(payload)?;
    if kind.matcher_type() != infer::MatcherType::Image {
        return None;
    }
    let ext = kind.extension();
    Some(if ext == "jpeg" { "jpg" } else { ext })
}

/// Writes the payload to `output_dir/{key}.{ext}`.
///
/// An existing file of the same name is silently overwritten; there is
/// no restart-safety guarantee across runs.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] when the write fails.
pub async fn save_avatar(
    payload: &[u8],
    output_dir: &Path,
    key: &str,
    ext: &str,
) -> Result<PathBuf, DownloadError> {
    let path = output_dir.join(format!("{key}.{ext}"));
    tokio::fs::write(&path, payload)
        .await
        .map_err(|e| DownloadError::io(&path, e))?;
    Ok(path)
}
