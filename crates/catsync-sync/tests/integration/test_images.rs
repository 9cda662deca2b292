//! Image ingestion over HTTP, including the cloud-drive confirmation retry

use std::sync::Arc;

use catsync_core::usecases::ImageIngestionPipeline;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, MemoryStore};

const DRIVE_LINK: &str = "https://drive.google.com/file/d/1AbCdEfGhIjK/view?usp=sharing";

#[tokio::test]
async fn test_drive_interstitial_is_retried_with_confirmation() {
    let (server, fetcher) = common::setup_image_mock().await;

    Mock::given(method("GET"))
        .and(path("/uc"))
        .and(query_param("id", "1AbCdEfGhIjK"))
        .and(query_param("confirm", "t"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(common::jpeg_body()),
        )
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/uc"))
        .and(query_param("id", "1AbCdEfGhIjK"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(common::DRIVE_INTERSTITIAL),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::default());
    let pipeline = ImageIngestionPipeline::new(fetcher, store.clone()).with_drive_base(server.uri());

    let product = common::product_with_thumbnail(DRIVE_LINK);
    let result = pipeline.ingest(&product, &[]).await;

    assert_eq!(
        result.thumbnail_url.as_deref(),
        Some("https://cdn.example.com/products/tea-cup/A1-thumbnail.jpg")
    );
    assert_eq!(result.source_urls, vec![DRIVE_LINK.to_string()]);
    assert_eq!(result.failed_slots, 0);

    let objects = store.objects.lock().unwrap();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].2, "image/jpeg");
}

#[tokio::test]
async fn test_drive_interstitial_twice_fails_the_slot() {
    let (server, fetcher) = common::setup_image_mock().await;

    Mock::given(method("GET"))
        .and(path("/uc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(common::DRIVE_INTERSTITIAL))
        .expect(2)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::default());
    let pipeline = ImageIngestionPipeline::new(fetcher, store.clone()).with_drive_base(server.uri());

    let result = pipeline
        .ingest(&common::product_with_thumbnail(DRIVE_LINK), &[])
        .await;

    assert!(result.thumbnail_url.is_none());
    assert_eq!(result.failed_slots, 1);
    assert!(result.source_urls.is_empty());
    assert!(store.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_tiny_body_is_rejected() {
    let (server, fetcher) = common::setup_image_mock().await;

    Mock::given(method("GET"))
        .and(path("/tiny.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 12]))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::default());
    let pipeline = ImageIngestionPipeline::new(fetcher, store.clone());

    let source = format!("{}/tiny.jpg", server.uri());
    let result = pipeline
        .ingest(&common::product_with_thumbnail(&source), &[])
        .await;

    assert_eq!(result.failed_slots, 1);
    assert!(store.objects.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unchanged_sources_download_nothing() {
    let (server, fetcher) = common::setup_image_mock().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(common::jpeg_body()))
        .expect(0)
        .mount(&server)
        .await;

    let source = format!("{}/cup.jpg", server.uri());
    let store = Arc::new(MemoryStore::default());
    let pipeline = ImageIngestionPipeline::new(fetcher, store);

    let result = pipeline
        .ingest(&common::product_with_thumbnail(&source), &[source.clone()])
        .await;

    assert!(result.keep_existing);
}
