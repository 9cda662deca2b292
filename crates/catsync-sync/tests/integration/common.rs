//! Shared helpers for image download integration tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use catsync_core::domain::{ImageSources, SheetProduct};
use catsync_core::ports::IObjectStore;
use catsync_sync::HttpImageFetcher;
use wiremock::MockServer;

/// A body comfortably above the minimum image size
pub fn jpeg_body() -> Vec<u8> {
    let mut body = vec![0xFF, 0xD8, 0xFF, 0xE0];
    body.resize(512, 0x42);
    body
}

pub const DRIVE_INTERSTITIAL: &str = "<!DOCTYPE html><html><head><title>Google Drive - Virus scan warning</title></head>\
<body><form action=\"/uc\"><input type=\"hidden\" name=\"confirm\" value=\"t\"></form></body></html>";

/// Starts a mock server and a fetcher with a short timeout
pub async fn setup_image_mock() -> (MockServer, Arc<HttpImageFetcher>) {
    let server = MockServer::start().await;
    let fetcher = HttpImageFetcher::new(Duration::from_secs(5)).expect("client builds");
    (server, Arc::new(fetcher))
}

/// Object store that records every upload in memory
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<Vec<(String, usize, String)>>,
}

#[async_trait::async_trait]
impl IObjectStore for MemoryStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
        self.objects
            .lock()
            .unwrap()
            .push((key.to_string(), bytes.len(), content_type.to_string()));
        Ok(format!("https://cdn.example.com/{key}"))
    }

    async fn list(&self, _prefix: &str) -> anyhow::Result<Vec<String>> {
        Ok(Vec::new())
    }

    async fn delete_many(&self, keys: &[String]) -> anyhow::Result<usize> {
        Ok(keys.len())
    }
}

/// A product with the given thumbnail source
pub fn product_with_thumbnail(source: &str) -> SheetProduct {
    SheetProduct {
        sku: "A1".into(),
        title: "Tea Cup".into(),
        handle: "tea-cup".into(),
        images: ImageSources {
            thumbnail: Some(source.to_string()),
            additional: Default::default(),
        },
        row: 2,
        ..SheetProduct::default()
    }
}
