//! Result of the image ingestion pipeline for one product

use serde::{Deserialize, Serialize};

/// Public URLs of the images uploaded for one product
///
/// `keep_existing` is set when the source references match the ones recorded
/// by a prior sync; nothing was downloaded and the existing images must be
/// left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub thumbnail_url: Option<String>,
    /// Uploaded additional images, in slot order
    pub image_urls: Vec<String>,
    /// Source references that were successfully uploaded, thumbnail first
    pub source_urls: Vec<String>,
    pub keep_existing: bool,
    /// Slots whose download or upload failed
    pub failed_slots: u32,
    /// Object keys of the failed slots; catalog images stored under them are kept
    pub failed_keys: Vec<String>,
}

impl UploadResult {
    /// Result for an image set that did not change since the last sync
    pub fn keep_existing() -> Self {
        Self {
            keep_existing: true,
            ..Self::default()
        }
    }

    /// Returns true when at least one image was uploaded
    pub fn has_images(&self) -> bool {
        self.thumbnail_url.is_some() || !self.image_urls.is_empty()
    }

    /// Number of images uploaded
    pub fn uploaded_count(&self) -> u32 {
        u32::from(self.thumbnail_url.is_some()) + self.image_urls.len() as u32
    }
}
