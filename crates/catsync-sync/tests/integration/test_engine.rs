//! A full batch against the real catalog adapter and a mocked admin API

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use catsync_commerce::catalog::CommerceCatalog;
use catsync_commerce::client::CommerceClient;
use catsync_core::config::ConfigBuilder;
use catsync_core::domain::{InventoryItem, InventoryItemChanges, InventoryLevel, StockLocation};
use catsync_core::ports::{CellWrite, IInventoryService, ISheetSource, IStockLocations};
use catsync_sync::{HttpImageFetcher, SyncEngine, SyncPorts};
use serde_json::Value;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::MemoryStore;

struct OneRowSheet {
    rows: Vec<Vec<String>>,
}

#[async_trait::async_trait]
impl ISheetSource for OneRowSheet {
    async fn read_range(&self, _range: &str) -> anyhow::Result<Vec<Vec<String>>> {
        Ok(self.rows.clone())
    }

    async fn batch_write(&self, _writes: &[CellWrite]) -> anyhow::Result<()> {
        Ok(())
    }
}

/// One inventory item with a single level at `sloc_main`
struct MemoryInventory {
    levels: Mutex<HashMap<String, i64>>,
}

#[async_trait::async_trait]
impl IInventoryService for MemoryInventory {
    async fn find_item_by_sku(&self, sku: &str) -> anyhow::Result<Option<InventoryItem>> {
        Ok(Some(InventoryItem {
            id: "iitem_1".into(),
            sku: Some(sku.to_string()),
            ..InventoryItem::default()
        }))
    }

    async fn find_item_for_variant(&self, _variant_id: &str) -> anyhow::Result<Option<InventoryItem>> {
        Ok(None)
    }

    async fn update_item(&self, _item_id: &str, _changes: &InventoryItemChanges) -> anyhow::Result<()> {
        Ok(())
    }

    async fn list_levels(&self, _item_id: &str) -> anyhow::Result<Vec<InventoryLevel>> {
        Ok(self
            .levels
            .lock()
            .unwrap()
            .iter()
            .map(|(location, quantity)| InventoryLevel {
                location_id: location.clone(),
                stocked_quantity: *quantity,
            })
            .collect())
    }

    async fn create_level(&self, _item_id: &str, location_id: &str, quantity: i64) -> anyhow::Result<()> {
        self.levels.lock().unwrap().insert(location_id.to_string(), quantity);
        Ok(())
    }

    async fn adjust_level(&self, _item_id: &str, location_id: &str, delta: i64) -> anyhow::Result<()> {
        *self.levels.lock().unwrap().entry(location_id.to_string()).or_insert(0) += delta;
        Ok(())
    }
}

#[async_trait::async_trait]
impl IStockLocations for MemoryInventory {
    async fn list_locations(&self) -> anyhow::Result<Vec<StockLocation>> {
        Ok(vec![StockLocation {
            id: "sloc_main".into(),
            name: "Main".into(),
        }])
    }
}

fn sheet_row(cells: &[(char, &str)]) -> Vec<String> {
    let mut values = vec![String::new(); 25];
    for (column, value) in cells {
        values[(*column as u8 - b'A') as usize] = value.to_string();
    }
    values
}

#[tokio::test]
async fn test_unknown_category_still_applies_fields_and_restock() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/admin/product-variants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "variants": [{"id": "variant_1", "sku": "A1", "product_id": "prod_1"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/products/prod_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "product": {
                "id": "prod_1",
                "handle": "tea-cup",
                "title": "Tea Cup",
                "variants": [{"id": "variant_1", "sku": "A1", "prices": []}]
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/admin/product-categories"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "product_categories": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = CommerceClient::new(server.uri(), "sk_test", Duration::from_secs(5)).unwrap();
    let inventory = Arc::new(MemoryInventory {
        levels: Mutex::new(HashMap::from([("sloc_main".to_string(), 10)])),
    });
    let sheet = OneRowSheet {
        rows: vec![
            sheet_row(&[('A', "SKU")]),
            sheet_row(&[
                ('A', "A1"),
                ('B', "Tea Mug"),
                ('G', "5"),
                ('H', "Main"),
                ('I', "Cupz"),
                ('X', "tea-cup"),
            ]),
        ],
    };
    let ports = SyncPorts {
        sheet: Arc::new(sheet),
        fetcher: Arc::new(HttpImageFetcher::new(Duration::from_secs(5)).unwrap()),
        store: Arc::new(MemoryStore::default()),
        catalog: Arc::new(CommerceCatalog::new(client, "eur")),
        inventory: inventory.clone(),
        locations: inventory.clone(),
    };
    let config = ConfigBuilder::new().sheet_tab("Products").build();

    let report = SyncEngine::new(ports, &config).run().await.unwrap();

    let outcome = report.entries[0].result.as_ref().unwrap();
    assert!(outcome.patch_applied);
    assert_eq!(report.inventory_applied(), 1);
    assert_eq!(inventory.levels.lock().unwrap()["sloc_main"], 15);

    let requests = server.received_requests().await.unwrap();
    let product_body: Value = requests
        .iter()
        .filter(|r| r.url.path() == "/admin/products/prod_1" && !r.body.is_empty())
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .next()
        .expect("product update was sent");
    assert_eq!(product_body["title"], "Tea Mug");
    assert!(product_body.get("categories").is_none());
}
