//! Sheet reader use case
//!
//! Reads the fixed product range, skips the header row and maps each row by
//! column position into a [`SheetProduct`]. Rows without a SKU or a title are
//! dropped before any side effect.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::domain::product::ADDITIONAL_IMAGE_SLOTS;
use crate::domain::{
    generate_handle, Dimensions, DomainError, ImageSources, ProductCodes, SheetProduct,
};
use crate::ports::ISheetSource;

/// Zero-based column positions of the product sheet (`A`..`Y`)
mod col {
    pub const SKU: usize = 0;
    pub const TITLE: usize = 1;
    pub const SUBTITLE: usize = 2;
    pub const DESCRIPTION: usize = 3;
    // 4 (`E`, costs) is internal and never read
    pub const PRICE: usize = 5;
    pub const RESTOCK_QTY: usize = 6;
    pub const LOCATION: usize = 7;
    pub const CATEGORY: usize = 8;
    pub const COLLECTION: usize = 9;
    pub const THUMBNAIL: usize = 10;
    pub const FIRST_IMAGE: usize = 11;
    pub const HEIGHT: usize = 14;
    pub const WIDTH: usize = 15;
    pub const LENGTH: usize = 16;
    pub const WEIGHT: usize = 17;
    pub const MID_CODE: usize = 18;
    pub const HS_CODE: usize = 19;
    pub const ORIGIN_COUNTRY: usize = 20;
    pub const TAGS: usize = 21;
    pub const EAN: usize = 22;
    pub const HANDLE: usize = 23;
}

/// Rows read from the sheet, after dropping unusable ones
#[derive(Debug, Clone)]
pub struct SheetRead {
    pub products: Vec<SheetProduct>,
    /// Data rows seen (header excluded)
    pub rows_read: usize,
    /// Data rows without SKU or title
    pub rows_dropped: usize,
}

/// Reads product rows from the spreadsheet
pub struct SheetReader {
    source: Arc<dyn ISheetSource + Send + Sync>,
    range: String,
}

impl SheetReader {
    /// Creates a reader for `range`, which must start at cell `A1`
    pub fn new(source: Arc<dyn ISheetSource + Send + Sync>, range: impl Into<String>) -> Self {
        Self {
            source,
            range: range.into(),
        }
    }

    /// Reads and parses every data row
    ///
    /// # Errors
    ///
    /// A transport or auth failure reading the range is returned as is; there
    /// is no meaningful partial read.
    pub async fn read(&self) -> Result<SheetRead> {
        let rows = self
            .source
            .read_range(&self.range)
            .await
            .with_context(|| format!("Failed to read sheet range {}", self.range))?;

        let data_rows = rows.len().saturating_sub(1);
        let products: Vec<SheetProduct> = rows
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(index, cells)| parse_row(index as u32 + 1, cells))
            .collect();

        let dropped = data_rows - products.len();
        info!(
            range = %self.range,
            rows = data_rows,
            products = products.len(),
            dropped,
            "Read product sheet"
        );

        Ok(SheetRead {
            products,
            rows_read: data_rows,
            rows_dropped: dropped,
        })
    }
}

/// Parses one sheet row; `row` is the 1-indexed spreadsheet row number
///
/// Returns `None` when the SKU or the title is blank.
pub fn parse_row(row: u32, cells: &[String]) -> Option<SheetProduct> {
    let sku = text(cells, col::SKU)?;
    let Some(title) = text(cells, col::TITLE) else {
        debug!(row, sku = %sku, "Dropping row without title");
        return None;
    };

    let (handle, handle_was_generated) = match text(cells, col::HANDLE) {
        Some(handle) => (handle, false),
        None => {
            let mut generated = generate_handle(&title);
            if generated.is_empty() {
                generated = generate_handle(&sku);
            }
            (generated, true)
        }
    };

    let mut additional: [Option<String>; ADDITIONAL_IMAGE_SLOTS] = Default::default();
    for (slot, value) in additional.iter_mut().enumerate() {
        *value = text(cells, col::FIRST_IMAGE + slot);
    }

    Some(SheetProduct {
        subtitle: text(cells, col::SUBTITLE),
        description: text(cells, col::DESCRIPTION),
        price: decimal(row, &sku, cells, col::PRICE, "price").filter(|p| *p != 0.0),
        restock_qty: restock_quantity(row, &sku, cells),
        location: text(cells, col::LOCATION),
        category: text(cells, col::CATEGORY),
        collection: text(cells, col::COLLECTION),
        images: ImageSources {
            thumbnail: text(cells, col::THUMBNAIL),
            additional,
        },
        dimensions: Dimensions {
            height_mm: decimal(row, &sku, cells, col::HEIGHT, "height"),
            width_mm: decimal(row, &sku, cells, col::WIDTH, "width"),
            length_mm: decimal(row, &sku, cells, col::LENGTH, "length"),
        },
        weight_g: decimal(row, &sku, cells, col::WEIGHT, "weight"),
        codes: ProductCodes {
            hs_code: text(cells, col::HS_CODE),
            mid_code: text(cells, col::MID_CODE),
            origin_country: text(cells, col::ORIGIN_COUNTRY),
        },
        tags: split_tags(cells.get(col::TAGS).map(String::as_str).unwrap_or_default()),
        ean: text(cells, col::EAN),
        handle,
        handle_was_generated,
        row,
        sku,
        title,
    })
}

/// Trimmed, non-empty cell text
fn text(cells: &[String], index: usize) -> Option<String> {
    cells
        .get(index)
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

/// Numeric cell, or `None` when blank or unreadable
fn decimal(row: u32, sku: &str, cells: &[String], index: usize, field: &str) -> Option<f64> {
    let raw = text(cells, index)?;
    match parse_decimal(field, &raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(row, sku, error = %err, "Ignoring unreadable number");
            None
        }
    }
}

/// Parses a currency-less decimal such as `12.50`, `12,50`, `1,234.50` or `1.234,50`
///
/// The last separator is the decimal point unless it repeats, in which case
/// every separator groups thousands (`1.234.567`).
pub fn parse_decimal(field: &str, raw: &str) -> Result<f64, DomainError> {
    const SEPARATORS: &[char] = &['.', ','];

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-'))
        .collect();
    let normalized = match cleaned.rfind(SEPARATORS) {
        None => cleaned,
        Some(pos) => {
            let last = &cleaned[pos..pos + 1];
            if cleaned.matches(last).count() > 1 {
                cleaned.replace(SEPARATORS, "")
            } else {
                format!("{}.{}", cleaned[..pos].replace(SEPARATORS, ""), &cleaned[pos + 1..])
            }
        }
    };

    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DomainError::InvalidValue {
            field: field.to_string(),
            value: raw.to_string(),
        })
}

fn restock_quantity(row: u32, sku: &str, cells: &[String]) -> u32 {
    match decimal(row, sku, cells, col::RESTOCK_QTY, "restock quantity") {
        None => 0,
        Some(qty) if qty < 0.0 => {
            warn!(row, sku, qty, "Negative restock quantity ignored");
            0
        }
        Some(qty) => qty.round().min(f64::from(u32::MAX)) as u32,
    }
}

/// Splits a comma-separated tag list, dropping empty tokens and duplicates
fn split_tags(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
