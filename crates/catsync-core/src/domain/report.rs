//! Batch report
//!
//! Every row yields a `Result<RowOutcome, RowError>`; the driver collects them
//! into a `BatchReport` together with the write-back status.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::errors::RowError;
use super::inventory::InventoryOutcome;
use super::patch::{MandatoryField, Patch};

/// What happened to one successfully processed row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowOutcome {
    pub catalog_product_id: String,
    /// The patch that was (or, in a dry run, would have been) applied
    pub patch: Patch,
    pub patch_applied: bool,
    pub images_uploaded: u32,
    pub image_failures: u32,
    /// Mandatory fields that were empty in the sheet and kept as is
    pub missing_mandatory: Vec<MandatoryField>,
    /// `None` when the inventory step failed; see `inventory_error`
    pub inventory: Option<InventoryOutcome>,
    pub inventory_error: Option<String>,
}

impl RowOutcome {
    /// Restock quantity consumed by this row
    pub fn quantity_applied(&self) -> u32 {
        self.inventory
            .as_ref()
            .map(InventoryOutcome::quantity_applied)
            .unwrap_or(0)
    }
}

/// One row of the batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowEntry {
    pub row: u32,
    pub sku: String,
    pub result: Result<RowOutcome, RowError>,
}

/// Result of the final spreadsheet write-back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WriteBackStatus {
    /// Nothing to write, or a dry run
    Skipped,
    Written { cells: usize },
    /// The write failed; listed SKUs had stock applied but their restock cell
    /// still holds the old quantity
    Failed {
        error: String,
        uncleared_restock_skus: Vec<String>,
    },
}

/// Aggregated result of one batch run
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub entries: Vec<RowEntry>,
    pub write_back: WriteBackStatus,
}

impl BatchReport {
    pub fn new(run_id: Uuid, dry_run: bool) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            dry_run,
            rows_read: 0,
            rows_dropped: 0,
            entries: Vec::new(),
            write_back: WriteBackStatus::Skipped,
        }
    }

    pub fn succeeded(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.entries.iter().filter(|e| e.result.is_err()).count()
    }

    /// Rows whose patch changed something in the catalog
    pub fn updated(&self) -> usize {
        self.outcomes().filter(|o| o.patch_applied).count()
    }

    pub fn images_uploaded(&self) -> u32 {
        self.outcomes().map(|o| o.images_uploaded).sum()
    }

    pub fn warnings(&self) -> usize {
        self.outcomes()
            .map(|o| o.missing_mandatory.len() + o.image_failures as usize)
            .sum()
    }

    pub fn inventory_applied(&self) -> usize {
        self.outcomes()
            .filter(|o| matches!(o.inventory, Some(InventoryOutcome::Applied { .. })))
            .count()
    }

    /// Rows whose inventory step was skipped or failed
    pub fn inventory_skipped(&self) -> usize {
        self.outcomes()
            .filter(|o| !matches!(o.inventory, Some(InventoryOutcome::Applied { .. })))
            .count()
    }

    fn outcomes(&self) -> impl Iterator<Item = &RowOutcome> {
        self.entries.iter().filter_map(|e| e.result.as_ref().ok())
    }
}
