//! Run command - one sheet-to-catalog sync batch
//!
//! Provides the `catsync run` CLI command which:
//! 1. Validates the configuration
//! 2. Constructs the sheet, storage, commerce and image adapters once
//! 3. Runs the SyncEngine and prints the batch report

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use catsync_commerce::catalog::CommerceCatalog;
use catsync_commerce::client::CommerceClient;
use catsync_commerce::inventory::CommerceInventory;
use catsync_core::config::Config;
use catsync_sheets::auth::{ServiceAccountAuth, ServiceAccountKey};
use catsync_sheets::client::SheetsClient;
use catsync_sheets::provider::GoogleSheetSource;
use catsync_storage::S3ObjectStore;
use catsync_sync::{HttpImageFetcher, SyncEngine, SyncPorts};

use crate::output::{get_formatter, print_report, OutputFormat};

#[derive(Debug, Default, Args)]
pub struct RunCommand {
    /// Compute patches and inventory plans without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

impl RunCommand {
    pub async fn execute(&self, config: &Config, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        super::refuse_invalid(formatter.as_ref(), &config.validate())?;

        let ports = build_ports(config)?;
        let engine = SyncEngine::new(ports, config).with_dry_run(self.dry_run);

        info!(dry_run = self.dry_run, tab = %config.sheet.tab, "Running sync");
        let report = engine.run().await.context("Sync batch aborted")?;

        print_report(formatter.as_ref(), format, &report);
        Ok(())
    }
}

/// Creates every adapter once; the engine receives them as trait objects
fn build_ports(config: &Config) -> Result<SyncPorts> {
    let key = ServiceAccountKey::from_file(&config.sheet.credentials_file).with_context(|| {
        format!(
            "Failed to load service account key from {}",
            config.sheet.credentials_file.display()
        )
    })?;
    let sheet_timeout = Duration::from_secs(config.sheet.request_timeout_secs);
    let sheets = SheetsClient::new(ServiceAccountAuth::new(key, sheet_timeout)?, sheet_timeout)?;
    let sheet = Arc::new(GoogleSheetSource::new(sheets, config.sheet.spreadsheet_id.clone()));

    let commerce = CommerceClient::new(
        config.commerce.base_url.clone(),
        config.commerce.api_key.clone(),
        Duration::from_secs(config.commerce.request_timeout_secs),
    )?;
    let catalog = Arc::new(CommerceCatalog::new(
        commerce.clone(),
        config.commerce.currency_code.clone(),
    ));
    let inventory = Arc::new(CommerceInventory::new(commerce));

    let fetcher = HttpImageFetcher::new(Duration::from_secs(config.images.download_timeout_secs))?;

    Ok(SyncPorts {
        sheet,
        fetcher: Arc::new(fetcher),
        store: Arc::new(S3ObjectStore::new(&config.storage)),
        catalog,
        inventory: inventory.clone(),
        locations: inventory,
    })
}
