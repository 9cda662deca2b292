//! Inventory types: stock locations, items, levels and per-SKU updates

use serde::{Deserialize, Serialize};

use super::product::{Dimensions, ProductCodes, SheetProduct};

/// A named physical or virtual location holding inventory levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocation {
    pub id: String,
    pub name: String,
}

/// An inventory item as tracked by the backend's inventory service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: String,
    pub sku: Option<String>,
    pub title: Option<String>,
    pub dimensions: Dimensions,
    pub weight_g: Option<f64>,
    pub codes: ProductCodes,
}

/// Quantity of one inventory item at one stock location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLevel {
    pub location_id: String,
    pub stocked_quantity: i64,
}

/// Descriptive attribute changes for an inventory item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryItemChanges {
    pub title: Option<String>,
    pub height_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub length_mm: Option<f64>,
    pub weight_g: Option<f64>,
    pub hs_code: Option<String>,
    pub mid_code: Option<String>,
    pub origin_country: Option<String>,
}

impl InventoryItemChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.height_mm.is_none()
            && self.width_mm.is_none()
            && self.length_mm.is_none()
            && self.weight_g.is_none()
            && self.hs_code.is_none()
            && self.mid_code.is_none()
            && self.origin_country.is_none()
    }
}

/// Per-SKU inventory work derived from one sheet row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryUpdate {
    pub sku: String,
    /// Additive quantity; zero updates attributes only
    pub quantity_delta: u32,
    pub location_name: Option<String>,
    pub title: String,
    pub dimensions: Dimensions,
    pub weight_g: Option<f64>,
    pub codes: ProductCodes,
    /// Default variant, used for the variant-to-inventory-item fallback lookup
    pub variant_id: Option<String>,
}

impl InventoryUpdate {
    /// Builds the inventory update for a sheet row
    pub fn from_product(product: &SheetProduct, variant_id: Option<String>) -> Self {
        Self {
            sku: product.sku.clone(),
            quantity_delta: product.restock_qty,
            location_name: product.location.clone(),
            title: product.title.clone(),
            dimensions: product.dimensions,
            weight_g: product.weight_g,
            codes: product.codes.clone(),
            variant_id,
        }
    }
}

/// Why the inventory portion of a row was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InventorySkip {
    /// The sheet named a location that matches none of the known ones
    UnknownLocation {
        requested: String,
        available: Vec<String>,
    },
    /// The backend has no stock locations at all
    NoLocations,
    /// No inventory item is linked to the SKU (inventory tracking likely disabled)
    ItemNotFound,
}

/// Outcome of reconciling one `InventoryUpdate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InventoryOutcome {
    Applied {
        inventory_item_id: String,
        location: String,
        /// Quantity before the delta; `None` when a new level was created
        previous_quantity: Option<i64>,
        quantity_applied: u32,
        attributes_updated: bool,
    },
    Skipped(InventorySkip),
}

impl InventoryOutcome {
    /// Quantity actually added to stock, zero when skipped
    pub fn quantity_applied(&self) -> u32 {
        match self {
            Self::Applied {
                quantity_applied, ..
            } => *quantity_applied,
            Self::Skipped(_) => 0,
        }
    }
}
