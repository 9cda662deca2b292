//! Use cases (application services)
//!
//! Each use case is one component of the reconciliation pipeline and depends
//! only on the ports it calls, injected through its constructor:
//!
//! - [`SheetReader`] - reads and parses the product rows
//! - [`ImageIngestionPipeline`] - downloads image sources and stores them
//! - [`ChangeDetector`] - computes the minimal patch for one product (pure)
//! - [`InventoryReconciler`] - applies restock deltas and item attributes
//! - [`SyncStatusWriter`] - writes handles, restock resets and timestamps back
//! - [`LegacyImageSweeper`] - deletes images stored under the old key scheme

pub mod cleanup_images;
pub mod detect_changes;
pub mod ingest_images;
pub mod read_sheet;
pub mod reconcile_inventory;
pub mod write_status;

pub use cleanup_images::{is_legacy_key, LegacyImageSweeper, SweepReport, PRODUCT_IMAGE_PREFIX};
pub use detect_changes::{ChangeDetector, ClearedValue, Detection};
pub use ingest_images::{
    drive_file_id, is_drive_link, object_key, ImageIngestionPipeline, DEFAULT_DRIVE_BASE,
    DEFAULT_MIN_BODY_BYTES,
};
pub use read_sheet::{parse_row, SheetRead, SheetReader};
pub use reconcile_inventory::{resolve_location, InventoryReconciler};
pub use write_status::{StatusRow, SyncStatusWriter};
