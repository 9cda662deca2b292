//! Cleanup command - sweep legacy timestamped product images

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use catsync_core::config::Config;
use catsync_core::usecases::LegacyImageSweeper;
use catsync_storage::S3ObjectStore;

use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct CleanupImagesCommand {
    /// List matching objects without deleting them
    #[arg(long)]
    pub dry_run: bool,
}

impl CleanupImagesCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        let storage_errors: Vec<_> = config
            .validate()
            .into_iter()
            .filter(|e| e.field.starts_with("storage."))
            .collect();
        super::refuse_invalid(formatter.as_ref(), &storage_errors)?;

        let store = Arc::new(S3ObjectStore::new(&config.storage));
        let report = LegacyImageSweeper::new(store)
            .with_dry_run(self.dry_run)
            .sweep()
            .await
            .context("Legacy image sweep failed")?;

        if format == OutputFormat::Json {
            formatter.print_json(&serde_json::to_value(&report)?);
            return Ok(());
        }

        if self.dry_run {
            formatter.success(&format!(
                "{} of {} objects match the legacy naming scheme (dry run, nothing deleted)",
                report.matched, report.scanned
            ));
        } else {
            formatter.success(&format!(
                "Deleted {} of {} legacy objects ({} scanned)",
                report.deleted, report.matched, report.scanned
            ));
        }
        if report.failed_batches > 0 {
            formatter.warn(&format!("{} delete batch(es) failed", report.failed_batches));
        }
        for key in &report.sample {
            formatter.info(key);
        }
        Ok(())
    }
}
