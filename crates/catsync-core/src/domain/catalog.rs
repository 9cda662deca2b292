//! Existing catalog records, as read from the commerce backend
//!
//! These are port-level views: only the fields the change detector compares
//! are carried. The backend owns the full record.

use serde::{Deserialize, Serialize};

use super::product::{Dimensions, ProductCodes};

/// The default (first) variant of a catalog product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogVariant {
    pub id: String,
    pub sku: Option<String>,
    /// Price in whole currency units
    pub price: Option<i64>,
    pub dimensions: Dimensions,
    pub weight_g: Option<f64>,
    pub codes: ProductCodes,
    pub ean: Option<String>,
}

/// A catalog product with its default variant
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub id: String,
    pub handle: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    /// Source references recorded by the last image sync
    pub image_sources: Vec<String>,
    /// Category name
    pub category: Option<String>,
    /// Collection title
    pub collection: Option<String>,
    pub tags: Vec<String>,
    pub variant: Option<CatalogVariant>,
}
