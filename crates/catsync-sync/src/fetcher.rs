//! HTTP image fetcher
//!
//! Implements [`IImageFetcher`] over a shared `reqwest::Client`. Redirects are
//! followed (cloud-drive download links redirect at least once) and every
//! request carries the configured timeout.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;

use catsync_core::ports::{FetchedImage, IImageFetcher};

/// Redirect hops allowed per download
const MAX_REDIRECTS: usize = 10;

const USER_AGENT: &str = concat!("catsync/", env!("CARGO_PKG_VERSION"));

/// Downloads image bytes over HTTP(S)
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Creates a fetcher whose requests time out after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl IImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Download of {url} failed with status {status}");
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {url}"))?;

        debug!(url = %url, bytes = bytes.len(), content_type = ?content_type, "Fetched image");

        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
