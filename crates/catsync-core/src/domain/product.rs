//! Sheet product - one spreadsheet row in parsed form
//!
//! A `SheetProduct` is rebuilt from spreadsheet state on every batch run. It
//! has no identity beyond its SKU and the 1-indexed row it came from.

use serde::{Deserialize, Serialize};

/// Number of additional image columns after the thumbnail (`L`..`N`)
pub const ADDITIONAL_IMAGE_SLOTS: usize = 3;

/// Physical dimensions in millimetres
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub height_mm: Option<f64>,
    pub width_mm: Option<f64>,
    pub length_mm: Option<f64>,
}

/// Customs codes carried on the variant and the inventory item
///
/// HS code and origin country are mandatory; the MID code is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCodes {
    pub hs_code: Option<String>,
    pub mid_code: Option<String>,
    pub origin_country: Option<String>,
}

/// Image source references: a thumbnail plus up to three positional slots
///
/// Slots keep their column position so that storage keys stay stable when an
/// earlier slot is left blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSources {
    pub thumbnail: Option<String>,
    pub additional: [Option<String>; ADDITIONAL_IMAGE_SLOTS],
}

impl ImageSources {
    /// Returns true when no slot carries a reference
    pub fn is_empty(&self) -> bool {
        self.thumbnail.is_none() && self.additional.iter().all(Option::is_none)
    }

    /// All present source references in slot order (thumbnail first)
    pub fn all(&self) -> Vec<String> {
        self.thumbnail
            .iter()
            .chain(self.additional.iter().flatten())
            .cloned()
            .collect()
    }
}

/// One parsed spreadsheet row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetProduct {
    /// Stock-keeping unit, the join key with the backend
    pub sku: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    /// Currency-less decimal price; `None` when blank, zero or unparseable
    pub price: Option<f64>,
    /// Quantity to add to stock; consumed once applied
    pub restock_qty: u32,
    /// Stock location name; `None` means the default location
    pub location: Option<String>,
    pub category: Option<String>,
    pub collection: Option<String>,
    pub images: ImageSources,
    pub dimensions: Dimensions,
    /// Weight in grams
    pub weight_g: Option<f64>,
    pub codes: ProductCodes,
    pub tags: Vec<String>,
    pub ean: Option<String>,
    pub handle: String,
    /// Set when `handle` was derived from the title and must be written back
    pub handle_was_generated: bool,
    /// 1-indexed spreadsheet row, used only for write-back addressing
    pub row: u32,
}

impl SheetProduct {
    /// Price rounded to the nearest whole unit
    pub fn rounded_price(&self) -> Option<i64> {
        self.price.map(|p| p.round() as i64).filter(|p| *p != 0)
    }
}
