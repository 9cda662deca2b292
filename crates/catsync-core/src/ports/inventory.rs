//! Inventory ports (driven/secondary ports)

use crate::domain::{InventoryItem, InventoryItemChanges, InventoryLevel, StockLocation};

/// Port trait for inventory item and level operations
#[async_trait::async_trait]
pub trait IInventoryService: Send + Sync {
    /// Looks up an inventory item directly by SKU
    async fn find_item_by_sku(&self, sku: &str) -> anyhow::Result<Option<InventoryItem>>;

    /// Looks up the inventory item linked to a product variant
    async fn find_item_for_variant(&self, variant_id: &str)
        -> anyhow::Result<Option<InventoryItem>>;

    async fn update_item(&self, item_id: &str, changes: &InventoryItemChanges)
        -> anyhow::Result<()>;

    async fn list_levels(&self, item_id: &str) -> anyhow::Result<Vec<InventoryLevel>>;

    async fn create_level(&self, item_id: &str, location_id: &str, quantity: i64)
        -> anyhow::Result<()>;

    /// Adds `delta` to the stocked quantity of an existing level
    async fn adjust_level(&self, item_id: &str, location_id: &str, delta: i64)
        -> anyhow::Result<()>;
}

/// Port trait for stock location listing
#[async_trait::async_trait]
pub trait IStockLocations: Send + Sync {
    async fn list_locations(&self) -> anyhow::Result<Vec<StockLocation>>;
}
