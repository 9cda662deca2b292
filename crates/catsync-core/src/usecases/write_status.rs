//! Sync status write-back use case
//!
//! After a batch, writes back to the sheet in a single request: `G` reset to
//! zero for consumed restock quantities, `X` for generated handles and `Y`
//! with the last-synced timestamp. The write is not transactional with the
//! inventory changes already committed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::domain::WriteBackStatus;
use crate::ports::{cell_ref, CellWrite, ISheetSource};

const RESTOCK_COLUMN: char = 'G';
const HANDLE_COLUMN: char = 'X';
const LAST_SYNCED_COLUMN: char = 'Y';

/// Write-back for one successfully processed row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRow {
    pub row: u32,
    pub sku: String,
    /// A non-zero restock quantity was applied to stock
    pub restock_consumed: bool,
    /// Handle to persist when it was generated from the title
    pub generated_handle: Option<String>,
}

/// Writes sync status back to the spreadsheet
pub struct SyncStatusWriter {
    source: Arc<dyn ISheetSource + Send + Sync>,
    tab: String,
}

impl SyncStatusWriter {
    pub fn new(source: Arc<dyn ISheetSource + Send + Sync>, tab: impl Into<String>) -> Self {
        Self {
            source,
            tab: tab.into(),
        }
    }

    /// Builds the cell writes for `rows`, in row order
    pub fn cell_writes(&self, rows: &[StatusRow], synced_at: DateTime<Utc>) -> Vec<CellWrite> {
        let stamp = synced_at.format("%Y-%m-%d %H:%M:%S").to_string();
        let mut writes = Vec::with_capacity(rows.len() * 3);
        for status in rows {
            if status.restock_consumed {
                writes.push(CellWrite::new(
                    cell_ref(&self.tab, RESTOCK_COLUMN, status.row),
                    "0",
                ));
            }
            if let Some(handle) = &status.generated_handle {
                writes.push(CellWrite::new(
                    cell_ref(&self.tab, HANDLE_COLUMN, status.row),
                    handle.as_str(),
                ));
            }
            writes.push(CellWrite::new(
                cell_ref(&self.tab, LAST_SYNCED_COLUMN, status.row),
                stamp.as_str(),
            ));
        }
        writes
    }

    /// Submits one batched write for every row
    ///
    /// Failure is reported, not returned: catalog and inventory changes are
    /// already committed and are not rolled back.
    pub async fn write(&self, rows: &[StatusRow], synced_at: DateTime<Utc>) -> WriteBackStatus {
        if rows.is_empty() {
            return WriteBackStatus::Skipped;
        }

        let writes = self.cell_writes(rows, synced_at);
        match self.source.batch_write(&writes).await {
            Ok(()) => {
                info!(rows = rows.len(), cells = writes.len(), "Wrote sync status to sheet");
                WriteBackStatus::Written {
                    cells: writes.len(),
                }
            }
            Err(e) => {
                let uncleared: Vec<String> = rows
                    .iter()
                    .filter(|status| status.restock_consumed)
                    .map(|status| status.sku.clone())
                    .collect();
                error!(
                    error = %format!("{e:#}"),
                    uncleared_restock_skus = ?uncleared,
                    "Sheet write-back failed; restock quantities above were applied and will be applied again on the next run unless cleared"
                );
                WriteBackStatus::Failed {
                    error: format!("{e:#}"),
                    uncleared_restock_skus: uncleared,
                }
            }
        }
    }
}
