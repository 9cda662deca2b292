//! Domain entities and business logic
//!
//! This module contains the core domain types for catsync:
//! - Sheet rows parsed into `SheetProduct`
//! - Existing catalog records as read from the commerce backend
//! - The transient per-row values (`UploadResult`, `Patch`, `InventoryUpdate`)
//! - The batch report collected by the sync driver
//! - Domain-specific error types

pub mod catalog;
pub mod errors;
pub mod handle;
pub mod inventory;
pub mod patch;
pub mod product;
pub mod report;
pub mod upload;

// Re-export commonly used types
pub use catalog::{CatalogProduct, CatalogVariant};
pub use errors::{DomainError, RowError};
pub use handle::generate_handle;
pub use inventory::{
    InventoryItem, InventoryItemChanges, InventoryLevel, InventoryOutcome, InventorySkip,
    InventoryUpdate, StockLocation,
};
pub use patch::{FieldUpdate, MandatoryField, Patch, ProductChanges, VariantChanges};
pub use product::{Dimensions, ImageSources, ProductCodes, SheetProduct};
pub use report::{BatchReport, RowEntry, RowOutcome, WriteBackStatus};
pub use upload::UploadResult;
