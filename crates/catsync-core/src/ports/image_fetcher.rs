//! Image download port (driven/secondary port)

/// Raw bytes of a downloaded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// `Content-Type` reported by the server, if any
    pub content_type: Option<String>,
}

/// Port trait for downloading image bytes
///
/// Implementations follow HTTP redirects transparently and apply a fixed
/// per-request timeout. A non-success status is an error.
#[async_trait::async_trait]
pub trait IImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<FetchedImage>;
}
