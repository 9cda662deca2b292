//! Image ingestion use case
//!
//! Resolves every image reference of a product (direct URL or cloud-drive
//! share link), downloads it, checks it and stores it under a deterministic
//! key. Failures are per slot: a slot that cannot be fetched or stored yields
//! no URL and never aborts the row.

use std::sync::{Arc, OnceLock};

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::{SheetProduct, UploadResult};
use crate::ports::{FetchedImage, IImageFetcher, IObjectStore};

/// Public host serving direct downloads of shared drive files
pub const DEFAULT_DRIVE_BASE: &str = "https://drive.google.com";

/// Bodies smaller than this are error pages or placeholders, not images
pub const DEFAULT_MIN_BODY_BYTES: usize = 100;

const DRIVE_HOSTS: [&str; 2] = ["drive.google.com", "docs.google.com"];

// ============================================================================
// Drive links
// ============================================================================

fn drive_id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"/file/d/([A-Za-z0-9_-]+)",
            r"[?&]id=([A-Za-z0-9_-]+)",
            r"/d/([A-Za-z0-9_-]+)",
            r"open\?id=([A-Za-z0-9_-]+)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("drive id pattern is valid"))
        .collect()
    })
}

/// Returns true when `source` points at a cloud-drive share page
pub fn is_drive_link(source: &str) -> bool {
    Url::parse(source)
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .is_some_and(|host| DRIVE_HOSTS.contains(&host.as_str()))
}

/// Extracts the file identifier from a drive share link
///
/// Patterns are tried in order and the first match wins.
pub fn drive_file_id(source: &str) -> Option<String> {
    drive_id_patterns()
        .iter()
        .find_map(|pattern| pattern.captures(source))
        .and_then(|captures| captures.get(1))
        .map(|id| id.as_str().to_string())
}

fn looks_like_html(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let text = String::from_utf8_lossy(head);
    let start = text.trim_start().to_ascii_lowercase();
    start.starts_with("<!doctype") || start.starts_with("<html")
}

/// Content type implied by the extension of a direct image URL
fn content_type_for(source: &str) -> &'static str {
    let path = Url::parse(source)
        .map(|url| url.path().to_ascii_lowercase())
        .unwrap_or_else(|_| source.to_ascii_lowercase());
    if path.ends_with(".png") {
        "image/png"
    } else if path.ends_with(".webp") {
        "image/webp"
    } else if path.ends_with(".gif") {
        "image/gif"
    } else {
        "image/jpeg"
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Downloads a product's image sources and stores them in object storage
pub struct ImageIngestionPipeline {
    fetcher: Arc<dyn IImageFetcher + Send + Sync>,
    store: Arc<dyn IObjectStore + Send + Sync>,
    drive_base: String,
    min_body_bytes: usize,
}

impl ImageIngestionPipeline {
    pub fn new(
        fetcher: Arc<dyn IImageFetcher + Send + Sync>,
        store: Arc<dyn IObjectStore + Send + Sync>,
    ) -> Self {
        Self {
            fetcher,
            store,
            drive_base: DEFAULT_DRIVE_BASE.to_string(),
            min_body_bytes: DEFAULT_MIN_BODY_BYTES,
        }
    }

    /// Overrides the drive download host (used by tests)
    pub fn with_drive_base(mut self, base: impl Into<String>) -> Self {
        self.drive_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_min_body_bytes(mut self, min_body_bytes: usize) -> Self {
        self.min_body_bytes = min_body_bytes;
        self
    }

    /// Returns true when the sheet's image set needs no upload at all
    ///
    /// That is the case when the sheet names no images, or when it names
    /// exactly the sources recorded by the previous successful sync.
    pub fn is_unchanged(product: &SheetProduct, previous_sources: &[String]) -> bool {
        product.images.is_empty() || product.images.all() == previous_sources
    }

    /// Ingests every image slot of `product`, sequentially
    pub async fn ingest(&self, product: &SheetProduct, previous_sources: &[String]) -> UploadResult {
        if Self::is_unchanged(product, previous_sources) {
            debug!(sku = %product.sku, "Image set unchanged, keeping existing images");
            return UploadResult::keep_existing();
        }

        let mut result = UploadResult::default();

        if let Some(source) = &product.images.thumbnail {
            let key = object_key(&product.handle, &product.sku, "thumbnail");
            match self.ingest_one(source, &key).await {
                Ok(url) => {
                    result.thumbnail_url = Some(url);
                    result.source_urls.push(source.clone());
                }
                Err(e) => {
                    warn!(sku = %product.sku, slot = "thumbnail", source = %source, error = %format!("{e:#}"), "Image skipped");
                    result.failed_slots += 1;
                    result.failed_keys.push(key);
                }
            }
        }

        for (index, source) in product.images.additional.iter().enumerate() {
            let Some(source) = source else { continue };
            let slot = format!("image-{}", index + 1);
            let key = object_key(&product.handle, &product.sku, &slot);
            match self.ingest_one(source, &key).await {
                Ok(url) => {
                    result.image_urls.push(url);
                    result.source_urls.push(source.clone());
                }
                Err(e) => {
                    warn!(sku = %product.sku, slot = %slot, source = %source, error = %format!("{e:#}"), "Image skipped");
                    result.failed_slots += 1;
                    result.failed_keys.push(key);
                }
            }
        }

        info!(
            sku = %product.sku,
            uploaded = result.uploaded_count(),
            failed = result.failed_slots,
            "Images ingested"
        );
        result
    }

    async fn ingest_one(&self, source: &str, key: &str) -> Result<String> {
        let image = self.download(source).await?;
        let content_type = image
            .content_type
            .unwrap_or_else(|| content_type_for(source).to_string());
        self.store
            .put(key, image.bytes, &content_type)
            .await
            .with_context(|| format!("Failed to store {key}"))
    }

    async fn download(&self, source: &str) -> Result<FetchedImage> {
        let image = if is_drive_link(source) {
            self.download_from_drive(source).await?
        } else {
            let image = self.fetcher.fetch(source).await?;
            FetchedImage {
                content_type: Some(content_type_for(source).to_string()),
                ..image
            }
        };

        if image.bytes.len() < self.min_body_bytes {
            bail!(
                "Body of {} bytes is too small to be an image",
                image.bytes.len()
            );
        }
        Ok(image)
    }

    async fn download_from_drive(&self, source: &str) -> Result<FetchedImage> {
        let id = drive_file_id(source)
            .ok_or_else(|| anyhow!("No file id found in drive link {source}"))?;

        let url = format!("{}/uc?export=download&id={id}", self.drive_base);
        let mut image = self.fetcher.fetch(&url).await?;

        if looks_like_html(&image.bytes) {
            debug!(file_id = %id, "Drive returned an HTML page, retrying with confirmation");
            let url = format!("{}/uc?export=download&confirm=t&id={id}", self.drive_base);
            image = self.fetcher.fetch(&url).await?;
            if looks_like_html(&image.bytes) {
                bail!("Drive returned an HTML page instead of file {id}");
            }
        }

        let content_type = image
            .content_type
            .filter(|ct| ct.starts_with("image/"))
            .unwrap_or_else(|| "image/jpeg".to_string());
        Ok(FetchedImage {
            bytes: image.bytes,
            content_type: Some(content_type),
        })
    }
}

/// `products/{handle}/{sku}-{slot}.jpg`
pub fn object_key(handle: &str, sku: &str, slot: &str) -> String {
    format!("products/{handle}/{}-{slot}.jpg", sku.replace('/', "-"))
}
