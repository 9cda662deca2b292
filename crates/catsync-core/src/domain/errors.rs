//! Domain error types
//!
//! `DomainError` covers sheet values that cannot be read as their field type.
//! `RowError` is the per-row failure collected into the batch report; it never
//! aborts the batch.

use serde::Serialize;
use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A cell could not be interpreted as the expected type
    #[error("Invalid value for {field}: {value}")]
    InvalidValue {
        /// Column or field name
        field: String,
        /// The raw value as read
        value: String,
    },
}

/// Failure of a single sheet row
///
/// Carried in the batch report instead of being raised, so one bad row never
/// stops the remaining rows from being reconciled.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowError {
    /// No catalog product carries a variant with this SKU
    #[error("No catalog product found for SKU {sku}")]
    ProductNotFound {
        /// The SKU from the sheet
        sku: String,
    },

    /// Reading the existing catalog record failed
    #[error("Catalog lookup failed for SKU {sku}: {message}")]
    CatalogLookup {
        /// The SKU from the sheet
        sku: String,
        /// Adapter error, rendered with its context chain
        message: String,
    },

    /// Writing the computed patch failed
    #[error("Catalog update failed for SKU {sku}: {message}")]
    CatalogWrite {
        /// The SKU from the sheet
        sku: String,
        /// Adapter error, rendered with its context chain
        message: String,
    },
}

impl RowError {
    /// SKU of the row this error belongs to
    pub fn sku(&self) -> &str {
        match self {
            Self::ProductNotFound { sku }
            | Self::CatalogLookup { sku, .. }
            | Self::CatalogWrite { sku, .. } => sku,
        }
    }
}
