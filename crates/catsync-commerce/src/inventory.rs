//! [`IInventoryService`] and [`IStockLocations`] over the admin inventory API
//!
//! The admin API has no additive adjustment endpoint, so
//! [`adjust_level`](IInventoryService::adjust_level) reads the current level
//! and writes back the sum, never below zero.

use anyhow::{anyhow, Context, Result};
use catsync_core::domain::{
    Dimensions, InventoryItem, InventoryItemChanges, InventoryLevel, ProductCodes, StockLocation,
};
use catsync_core::ports::{IInventoryService, IStockLocations};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::client::CommerceClient;

// ============================================================================
// Admin API response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ApiInventoryItem {
    id: String,
    sku: Option<String>,
    title: Option<String>,
    height: Option<f64>,
    width: Option<f64>,
    length: Option<f64>,
    weight: Option<f64>,
    hs_code: Option<String>,
    mid_code: Option<String>,
    origin_country: Option<String>,
}

impl From<ApiInventoryItem> for InventoryItem {
    fn from(item: ApiInventoryItem) -> Self {
        Self {
            id: item.id,
            sku: item.sku,
            title: item.title,
            dimensions: Dimensions {
                height_mm: item.height,
                width_mm: item.width,
                length_mm: item.length,
            },
            weight_g: item.weight,
            codes: ProductCodes {
                hs_code: item.hs_code,
                mid_code: item.mid_code,
                origin_country: item.origin_country,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct InventoryItemList {
    #[serde(default)]
    inventory_items: Vec<ApiInventoryItem>,
}

#[derive(Debug, Deserialize)]
struct InventoryItemEnvelope {
    inventory_item: ApiInventoryItem,
}

#[derive(Debug, Deserialize)]
struct VariantLinkList {
    #[serde(default)]
    variants: Vec<VariantLinks>,
}

#[derive(Debug, Deserialize)]
struct VariantLinks {
    id: String,
    #[serde(default)]
    inventory_items: Vec<VariantInventoryLink>,
}

#[derive(Debug, Deserialize)]
struct VariantInventoryLink {
    inventory_item_id: String,
    inventory: Option<ApiInventoryItem>,
}

#[derive(Debug, Deserialize)]
struct LevelList {
    #[serde(default)]
    inventory_levels: Vec<ApiLevel>,
}

#[derive(Debug, Deserialize)]
struct ApiLevel {
    location_id: String,
    #[serde(default)]
    stocked_quantity: i64,
}

#[derive(Debug, Deserialize)]
struct LocationList {
    #[serde(default)]
    stock_locations: Vec<ApiLocation>,
}

#[derive(Debug, Deserialize)]
struct ApiLocation {
    id: String,
    name: String,
}

fn item_body(changes: &InventoryItemChanges) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(title) = &changes.title {
        body.insert("title".into(), json!(title));
    }
    for (field, value) in [
        ("height", changes.height_mm),
        ("width", changes.width_mm),
        ("length", changes.length_mm),
        ("weight", changes.weight_g),
    ] {
        if let Some(value) = value {
            body.insert(field.into(), json!(value));
        }
    }
    for (field, value) in [
        ("hs_code", &changes.hs_code),
        ("mid_code", &changes.mid_code),
    ] {
        if let Some(value) = value {
            body.insert(field.into(), json!(value));
        }
    }
    if let Some(origin) = &changes.origin_country {
        body.insert("origin_country".into(), json!(origin.to_lowercase()));
    }
    body
}

// ============================================================================
// CommerceInventory
// ============================================================================

/// Inventory items, levels and stock locations backed by the admin API
pub struct CommerceInventory {
    client: CommerceClient,
}

impl CommerceInventory {
    pub fn new(client: CommerceClient) -> Self {
        Self { client }
    }

    async fn levels(&self, item_id: &str) -> Result<Vec<InventoryLevel>> {
        let list: LevelList = self
            .client
            .get(
                &format!("/admin/inventory-items/{item_id}/location-levels"),
                &[("limit", "100")],
            )
            .await
            .with_context(|| format!("Failed to list levels of {item_id}"))?;
        Ok(list
            .inventory_levels
            .into_iter()
            .map(|level| InventoryLevel {
                location_id: level.location_id,
                stocked_quantity: level.stocked_quantity,
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl IInventoryService for CommerceInventory {
    async fn find_item_by_sku(&self, sku: &str) -> Result<Option<InventoryItem>> {
        let list: InventoryItemList = self
            .client
            .get("/admin/inventory-items", &[("sku", sku)])
            .await
            .with_context(|| format!("Failed to look up inventory item {sku}"))?;
        Ok(list
            .inventory_items
            .into_iter()
            .find(|item| item.sku.as_deref() == Some(sku))
            .map(InventoryItem::from))
    }

    async fn find_item_for_variant(&self, variant_id: &str) -> Result<Option<InventoryItem>> {
        let list: VariantLinkList = self
            .client
            .get(
                "/admin/product-variants",
                &[
                    ("id", variant_id),
                    ("fields", "id,*inventory_items,*inventory_items.inventory"),
                ],
            )
            .await
            .with_context(|| format!("Failed to load inventory links of {variant_id}"))?;

        let Some(link) = list
            .variants
            .into_iter()
            .find(|v| v.id == variant_id)
            .and_then(|v| v.inventory_items.into_iter().next())
        else {
            return Ok(None);
        };

        if let Some(item) = link.inventory {
            return Ok(Some(item.into()));
        }

        debug!(variant_id, item_id = %link.inventory_item_id, "Loading linked inventory item");
        let envelope: InventoryItemEnvelope = self
            .client
            .get(&format!("/admin/inventory-items/{}", link.inventory_item_id), &[])
            .await
            .with_context(|| format!("Failed to load inventory item {}", link.inventory_item_id))?;
        Ok(Some(envelope.inventory_item.into()))
    }

    async fn update_item(&self, item_id: &str, changes: &InventoryItemChanges) -> Result<()> {
        let _: Value = self
            .client
            .post(&format!("/admin/inventory-items/{item_id}"), &item_body(changes))
            .await
            .with_context(|| format!("Failed to update inventory item {item_id}"))?;
        Ok(())
    }

    async fn list_levels(&self, item_id: &str) -> Result<Vec<InventoryLevel>> {
        self.levels(item_id).await
    }

    async fn create_level(&self, item_id: &str, location_id: &str, quantity: i64) -> Result<()> {
        let _: Value = self
            .client
            .post(
                &format!("/admin/inventory-items/{item_id}/location-levels"),
                &json!({ "location_id": location_id, "stocked_quantity": quantity }),
            )
            .await
            .with_context(|| format!("Failed to create level of {item_id} at {location_id}"))?;
        Ok(())
    }

    async fn adjust_level(&self, item_id: &str, location_id: &str, delta: i64) -> Result<()> {
        let current = self
            .levels(item_id)
            .await?
            .into_iter()
            .find(|level| level.location_id == location_id)
            .map(|level| level.stocked_quantity)
            .ok_or_else(|| anyhow!("Inventory item {item_id} has no level at {location_id}"))?;

        let target = (current + delta).max(0);
        let _: Value = self
            .client
            .post(
                &format!("/admin/inventory-items/{item_id}/location-levels/{location_id}"),
                &json!({ "stocked_quantity": target }),
            )
            .await
            .with_context(|| format!("Failed to adjust level of {item_id} at {location_id}"))?;
        debug!(item_id, location_id, current, delta, target, "Adjusted stock level");
        Ok(())
    }
}

#[async_trait::async_trait]
impl IStockLocations for CommerceInventory {
    async fn list_locations(&self) -> Result<Vec<StockLocation>> {
        let list: LocationList = self
            .client
            .get(
                "/admin/stock-locations",
                &[("fields", "id,name"), ("order", "created_at"), ("limit", "100")],
            )
            .await
            .context("Failed to list stock locations")?;
        Ok(list
            .stock_locations
            .into_iter()
            .map(|location| StockLocation {
                id: location.id,
                name: location.name,
            })
            .collect())
    }
}
