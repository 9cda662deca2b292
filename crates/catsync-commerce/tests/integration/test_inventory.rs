//! Inventory items, levels and stock locations against a mocked admin API

use catsync_commerce::inventory::CommerceInventory;
use catsync_commerce::CommerceError;
use catsync_core::domain::InventoryItemChanges;
use catsync_core::ports::{IInventoryService, IStockLocations};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_find_item_by_sku_requires_exact_match() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/inventory-items"))
        .and(query_param("sku", "A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "inventory_items": [
                {"id": "iitem_10", "sku": "A10"},
                {"id": "iitem_1", "sku": "A1", "title": "Tea Cup", "weight": 240}
            ]
        })))
        .mount(&server)
        .await;

    let inventory = CommerceInventory::new(client);
    let item = inventory.find_item_by_sku("A1").await.unwrap().unwrap();
    assert_eq!(item.id, "iitem_1");
    assert_eq!(item.weight_g, Some(240.0));
}

#[tokio::test]
async fn test_find_item_for_variant_loads_linked_item() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/product-variants"))
        .and(query_param("id", "variant_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "variants": [{
                "id": "variant_1",
                "inventory_items": [{"inventory_item_id": "iitem_7", "variant_id": "variant_1"}]
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/inventory-items/iitem_7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "inventory_item": {"id": "iitem_7", "sku": null}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let inventory = CommerceInventory::new(client);
    let item = inventory.find_item_for_variant("variant_1").await.unwrap().unwrap();
    assert_eq!(item.id, "iitem_7");
}

#[tokio::test]
async fn test_adjust_level_adds_delta_to_current() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/inventory-items/iitem_1/location-levels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "inventory_levels": [
                {"location_id": "sloc_wh", "stocked_quantity": 2},
                {"location_id": "sloc_main", "stocked_quantity": 10}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/inventory-items/iitem_1/location-levels/sloc_main"))
        .and(body_json(serde_json::json!({"stocked_quantity": 15})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let inventory = CommerceInventory::new(client);
    inventory.adjust_level("iitem_1", "sloc_main", 5).await.unwrap();
}

#[tokio::test]
async fn test_adjust_level_without_level_fails() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/inventory-items/iitem_1/location-levels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "inventory_levels": []
        })))
        .mount(&server)
        .await;

    let inventory = CommerceInventory::new(client);
    assert!(inventory.adjust_level("iitem_1", "sloc_main", 5).await.is_err());
}

#[tokio::test]
async fn test_create_level_and_update_item() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("POST"))
        .and(path("/admin/inventory-items/iitem_1/location-levels"))
        .and(body_json(serde_json::json!({"location_id": "sloc_main", "stocked_quantity": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/admin/inventory-items/iitem_1"))
        .and(body_json(serde_json::json!({"hs_code": "6912"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let inventory = CommerceInventory::new(client);
    inventory.create_level("iitem_1", "sloc_main", 3).await.unwrap();
    inventory
        .update_item(
            "iitem_1",
            &InventoryItemChanges {
                hs_code: Some("6912".into()),
                ..InventoryItemChanges::default()
            },
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn test_list_locations_keeps_backend_order() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .and(path("/admin/stock-locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "stock_locations": [
                {"id": "sloc_main", "name": "Main"},
                {"id": "sloc_wh", "name": "Warehouse"}
            ]
        })))
        .mount(&server)
        .await;

    let inventory = CommerceInventory::new(client);
    let names: Vec<String> = inventory
        .list_locations()
        .await
        .unwrap()
        .into_iter()
        .map(|l| l.name)
        .collect();
    assert_eq!(names, vec!["Main", "Warehouse"]);
}

#[tokio::test]
async fn test_unauthorized_is_reported() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&server)
        .await;

    let inventory = CommerceInventory::new(client);
    let err = inventory.list_locations().await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CommerceError>(),
        Some(CommerceError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_429_is_retried() {
    let (server, client) = common::setup_commerce_mock().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/stock-locations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "stock_locations": [{"id": "sloc_main", "name": "Main"}]
        })))
        .mount(&server)
        .await;

    let inventory = CommerceInventory::new(client);
    assert_eq!(inventory.list_locations().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let (server, client) =
        common::setup_commerce_mock_with_timeout(std::time::Duration::from_millis(200)).await;

    Mock::given(method("GET"))
        .and(path("/admin/stock-locations"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(5))
                .set_body_json(serde_json::json!({"stock_locations": []})),
        )
        .mount(&server)
        .await;

    let inventory = CommerceInventory::new(client);
    let err = inventory.list_locations().await.unwrap_err();
    let err = err.downcast_ref::<CommerceError>().expect("commerce error");
    assert!(matches!(err, CommerceError::NetworkError(e) if e.is_timeout()));
}
