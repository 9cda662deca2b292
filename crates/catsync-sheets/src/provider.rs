//! [`ISheetSource`] implementation backed by the Sheets API

use anyhow::{Context, Result};
use catsync_core::ports::{CellWrite, ISheetSource};
use tracing::info;

use crate::client::SheetsClient;

/// The product spreadsheet, addressed by id
pub struct GoogleSheetSource {
    client: SheetsClient,
    spreadsheet_id: String,
}

impl GoogleSheetSource {
    pub fn new(client: SheetsClient, spreadsheet_id: impl Into<String>) -> Self {
        Self {
            client,
            spreadsheet_id: spreadsheet_id.into(),
        }
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }
}

#[async_trait::async_trait]
impl ISheetSource for GoogleSheetSource {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let rows = self
            .client
            .get_values(&self.spreadsheet_id, range)
            .await
            .with_context(|| format!("Failed to read {range} from spreadsheet {}", self.spreadsheet_id))?;
        Ok(rows)
    }

    async fn batch_write(&self, writes: &[CellWrite]) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }
        let updated = self
            .client
            .batch_update_values(&self.spreadsheet_id, writes)
            .await
            .with_context(|| format!("Failed to write {} cells to spreadsheet {}", writes.len(), self.spreadsheet_id))?;
        info!(requested = writes.len(), updated, "Spreadsheet batch update applied");
        Ok(())
    }
}
