//! Product lookup and patch application against a mocked admin API

use catsync_commerce::catalog::CommerceCatalog;
use catsync_core::domain::{FieldUpdate, Patch, ProductChanges, VariantChanges};
use catsync_core::ports::IProductCatalog;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, AUTH_HEADER};

#[tokio::test]
async fn test_find_by_sku_loads_product() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/product-variants"))
        .and(query_param("sku", "A1"))
        .and(header("authorization", AUTH_HEADER))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "variants": [{"id": "variant_1", "sku": "A1", "product_id": "prod_1"}],
            "count": 1
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/products/prod_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::product_json()))
        .expect(1)
        .mount(&server)
        .await;

    let catalog = CommerceCatalog::new(client, "EUR");
    let product = catalog.find_by_sku("A1").await.unwrap().unwrap();

    assert_eq!(product.id, "prod_1");
    assert_eq!(product.tags, vec!["bestseller"]);
    let variant = product.variant.unwrap();
    assert_eq!(variant.price, Some(12));
    assert_eq!(variant.codes.mid_code.as_deref(), Some("MID1"));
}

#[tokio::test]
async fn test_unknown_sku_is_none() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/product-variants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "variants": [], "count": 0
        })))
        .mount(&server)
        .await;

    let catalog = CommerceCatalog::new(client, "eur");
    assert!(catalog.find_by_sku("NOPE").await.unwrap().is_none());
}

#[tokio::test]
async fn test_apply_patch_resolves_names_and_clears_tags() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/product-categories"))
        .and(query_param("q", "Cups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "product_categories": [
                {"id": "pcat_9", "name": "Cups and Mugs"},
                {"id": "pcat_1", "name": "Cups"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/products/prod_1"))
        .and(body_json(serde_json::json!({
            "title": "Tea Mug",
            "categories": [{"id": "pcat_1"}],
            "collection_id": null,
            "tags": []
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"product": {"id": "prod_1"}})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/admin/products/prod_1/variants/variant_1"))
        .and(body_json(serde_json::json!({
            "prices": [{"amount": 15, "currency_code": "eur"}],
            "ean": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"product": {"id": "prod_1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let patch = Patch {
        product: ProductChanges {
            title: Some("Tea Mug".into()),
            ..ProductChanges::default()
        },
        keep_existing_images: true,
        variant: Some(VariantChanges {
            price: Some(15),
            ean: Some(FieldUpdate::Clear),
            ..VariantChanges::for_variant("variant_1")
        }),
        category: Some(FieldUpdate::Set("Cups".into())),
        collection: Some(FieldUpdate::Clear),
        tags: Some(FieldUpdate::Clear),
    };

    let catalog = CommerceCatalog::new(client, "eur");
    catalog.apply_patch("prod_1", &patch).await.unwrap();
}

#[tokio::test]
async fn test_missing_tag_is_created_once() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/product-tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "product_tags": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/product-tags"))
        .and(body_json(serde_json::json!({"value": "new"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "product_tag": {"id": "ptag_new", "value": "new"}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/products/prod_1"))
        .and(body_json(serde_json::json!({"tags": [{"id": "ptag_new"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let patch = Patch {
        tags: Some(FieldUpdate::Set(vec!["new".into()])),
        ..Patch::default()
    };
    let catalog = CommerceCatalog::new(client, "eur");
    catalog.apply_patch("prod_1", &patch).await.unwrap();
    catalog.apply_patch("prod_1", &patch).await.unwrap();
}

#[tokio::test]
async fn test_unknown_category_and_collection_are_skipped() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/product-categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "product_categories": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/collections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "collections": [{"id": "pcol_1", "title": "Autumn"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/products/prod_1"))
        .and(body_json(serde_json::json!({"title": "Tea Mug"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/products/prod_1/variants/variant_1"))
        .and(body_json(serde_json::json!({
            "prices": [{"amount": 15, "currency_code": "eur"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let patch = Patch {
        product: ProductChanges {
            title: Some("Tea Mug".into()),
            ..ProductChanges::default()
        },
        keep_existing_images: true,
        variant: Some(VariantChanges {
            price: Some(15),
            ..VariantChanges::for_variant("variant_1")
        }),
        category: Some(FieldUpdate::Set("Cupz".into())),
        collection: Some(FieldUpdate::Set("Spring".into())),
        ..Patch::default()
    };
    let catalog = CommerceCatalog::new(client, "eur");
    catalog.apply_patch("prod_1", &patch).await.unwrap();
}

#[tokio::test]
async fn test_category_lookup_failure_still_fails_the_patch() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/product-categories"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let patch = Patch {
        category: Some(FieldUpdate::Set("Cups".into())),
        ..Patch::default()
    };
    let catalog = CommerceCatalog::new(client, "eur");
    assert!(catalog.apply_patch("prod_1", &patch).await.is_err());
}

#[tokio::test]
async fn test_image_fields_are_written_unless_kept() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("POST"))
        .and(path("/admin/products/prod_1"))
        .and(body_json(serde_json::json!({
            "thumbnail": "https://cdn.test/products/tea-cup/A1-thumbnail.jpg",
            "images": [{"url": "https://cdn.test/products/tea-cup/A1-thumbnail.jpg"}],
            "metadata": {"image_sources": ["https://img.test/t.jpg"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let patch = Patch {
        product: ProductChanges {
            thumbnail: Some("https://cdn.test/products/tea-cup/A1-thumbnail.jpg".into()),
            images: Some(vec!["https://cdn.test/products/tea-cup/A1-thumbnail.jpg".into()]),
            image_sources: Some(vec!["https://img.test/t.jpg".into()]),
            ..ProductChanges::default()
        },
        ..Patch::default()
    };
    let catalog = CommerceCatalog::new(client, "eur");
    catalog.apply_patch("prod_1", &patch).await.unwrap();
}
