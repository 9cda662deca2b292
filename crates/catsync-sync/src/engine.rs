//! Batch synchronization engine
//!
//! The [`SyncEngine`] reconciles the product sheet with the commerce backend
//! in one sequential pass.
//!
//! ## Batch Flow
//!
//! 1. **Read**: parse every data row of the sheet (fatal on failure)
//! 2. **Per row**: look up the catalog product, ingest images, compute and
//!    apply the patch, then reconcile inventory
//! 3. **Write-back**: one batched sheet write clearing consumed restock
//!    quantities, persisting generated handles and stamping the sync time
//! 4. **Sweep** (optional): delete legacy timestamped image objects
//!
//! Every row yields a `Result<RowOutcome, RowError>` collected into the
//! [`BatchReport`]. Inventory is applied before the write-back, so a failed
//! write-back leaves restock quantities that the next run applies again;
//! those SKUs are listed in [`WriteBackStatus::Failed`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use catsync_core::config::Config;
use catsync_core::domain::{
    BatchReport, InventoryUpdate, RowEntry, RowError, RowOutcome, SheetProduct, StockLocation,
    UploadResult, WriteBackStatus,
};
use catsync_core::ports::{
    IImageFetcher, IInventoryService, IObjectStore, IProductCatalog, ISheetSource, IStockLocations,
};
use catsync_core::usecases::{
    ChangeDetector, ImageIngestionPipeline, InventoryReconciler, LegacyImageSweeper, SheetReader,
    StatusRow, SyncStatusWriter,
};

use crate::SyncError;

// ============================================================================
// Ports
// ============================================================================

/// Every external capability the engine needs, constructed once by the caller
#[derive(Clone)]
pub struct SyncPorts {
    pub sheet: Arc<dyn ISheetSource + Send + Sync>,
    pub fetcher: Arc<dyn IImageFetcher + Send + Sync>,
    pub store: Arc<dyn IObjectStore + Send + Sync>,
    pub catalog: Arc<dyn IProductCatalog + Send + Sync>,
    pub inventory: Arc<dyn IInventoryService + Send + Sync>,
    pub locations: Arc<dyn IStockLocations + Send + Sync>,
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Runs sheet-to-catalog batches
pub struct SyncEngine {
    reader: SheetReader,
    pipeline: ImageIngestionPipeline,
    detector: ChangeDetector,
    reconciler: InventoryReconciler,
    writer: SyncStatusWriter,
    catalog: Arc<dyn IProductCatalog + Send + Sync>,
    /// Present when legacy images are swept after each batch
    sweeper: Option<LegacyImageSweeper>,
    dry_run: bool,
}

impl SyncEngine {
    /// Creates an engine wired to `ports`
    ///
    /// # Arguments
    /// * `ports` - External capabilities (sheet, images, storage, catalog, inventory)
    /// * `config` - Sheet range, tab, image and cleanup settings
    pub fn new(ports: SyncPorts, config: &Config) -> Self {
        let sweeper = config
            .storage
            .cleanup_legacy_after_sync
            .then(|| LegacyImageSweeper::new(Arc::clone(&ports.store)));

        Self {
            reader: SheetReader::new(Arc::clone(&ports.sheet), config.sheet_range()),
            pipeline: ImageIngestionPipeline::new(ports.fetcher, ports.store)
                .with_min_body_bytes(config.images.min_body_bytes),
            detector: ChangeDetector::new(),
            reconciler: InventoryReconciler::new(ports.inventory, ports.locations),
            writer: SyncStatusWriter::new(ports.sheet, config.sheet.tab.clone()),
            catalog: ports.catalog,
            sweeper,
            dry_run: false,
        }
    }

    /// Computes every patch and inventory plan without writing anywhere
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self.reconciler = self.reconciler.with_dry_run(dry_run);
        self
    }

    /// Overrides the cloud-drive download host (used by tests)
    pub fn with_drive_base(mut self, base: impl Into<String>) -> Self {
        self.pipeline = self.pipeline.with_drive_base(base);
        self
    }

    /// Returns true if this engine performs no writes
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Runs one batch
    ///
    /// # Errors
    ///
    /// Only a failed sheet read is returned as an error. Every other failure
    /// is recorded per row in the returned report.
    pub async fn run(&self) -> Result<BatchReport, SyncError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("sync_run", run_id = %run_id);
        self.run_batch(run_id).instrument(span).await
    }

    async fn run_batch(&self, run_id: Uuid) -> Result<BatchReport, SyncError> {
        let mut report = BatchReport::new(run_id, self.dry_run);
        info!(dry_run = self.dry_run, "Starting sync batch");

        let sheet = self.reader.read().await.map_err(|e| {
            error!(error = %format!("{e:#}"), "Sheet read failed, aborting batch");
            SyncError::SheetRead(format!("{e:#}"))
        })?;
        report.rows_read = sheet.rows_read;
        report.rows_dropped = sheet.rows_dropped;

        let locations = match self.reconciler.load_locations().await {
            Ok(locations) => locations,
            Err(e) => {
                error!(error = %format!("{e:#}"), "Could not load stock locations, inventory updates will be skipped");
                Vec::new()
            }
        };

        let mut status_rows = Vec::new();
        for product in &sheet.products {
            let result = self.process_row(product, &locations).await;
            match &result {
                Ok(outcome) => status_rows.push(StatusRow {
                    row: product.row,
                    sku: product.sku.clone(),
                    restock_consumed: outcome.quantity_applied() > 0,
                    generated_handle: product
                        .handle_was_generated
                        .then(|| product.handle.clone()),
                }),
                Err(e) => error!(row = product.row, sku = %product.sku, error = %e, "Row failed"),
            }
            report.entries.push(RowEntry {
                row: product.row,
                sku: product.sku.clone(),
                result,
            });
        }

        report.write_back = if self.dry_run {
            WriteBackStatus::Skipped
        } else {
            self.writer.write(&status_rows, Utc::now()).await
        };

        if let Some(sweeper) = &self.sweeper {
            if !self.dry_run {
                match sweeper.sweep().await {
                    Ok(sweep) => info!(deleted = sweep.deleted, matched = sweep.matched, "Legacy image sweep finished"),
                    Err(e) => warn!(error = %format!("{e:#}"), "Legacy image sweep failed"),
                }
            }
        }

        report.finished_at = Some(Utc::now());
        info!(
            rows = report.entries.len(),
            succeeded = report.succeeded(),
            failed = report.failed(),
            updated = report.updated(),
            images_uploaded = report.images_uploaded(),
            warnings = report.warnings(),
            inventory_applied = report.inventory_applied(),
            "Sync batch finished"
        );
        Ok(report)
    }

    async fn process_row(
        &self,
        product: &SheetProduct,
        locations: &[StockLocation],
    ) -> Result<RowOutcome, RowError> {
        let existing = match self.catalog.find_by_sku(&product.sku).await {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                return Err(RowError::ProductNotFound {
                    sku: product.sku.clone(),
                })
            }
            Err(e) => {
                return Err(RowError::CatalogLookup {
                    sku: product.sku.clone(),
                    message: format!("{e:#}"),
                })
            }
        };

        let upload = if self.dry_run {
            if !ImageIngestionPipeline::is_unchanged(product, &existing.image_sources) {
                info!(sku = %product.sku, "Dry run: image set changed and would be uploaded");
            }
            UploadResult::keep_existing()
        } else {
            self.pipeline.ingest(product, &existing.image_sources).await
        };

        let detection = self.detector.detect(product, &upload, &existing);
        for field in &detection.missing_mandatory {
            warn!(row = product.row, sku = %product.sku, field = %field, "Mandatory field empty in sheet, keeping catalog value");
        }
        for cleared in &detection.cleared {
            info!(sku = %product.sku, field = cleared.field, previous = %cleared.previous, "Clearing optional value");
        }

        let mut patch_applied = false;
        if !detection.patch.is_empty() && !self.dry_run {
            self.catalog
                .apply_patch(&existing.id, &detection.patch)
                .await
                .map_err(|e| RowError::CatalogWrite {
                    sku: product.sku.clone(),
                    message: format!("{e:#}"),
                })?;
            patch_applied = true;
            info!(sku = %product.sku, product_id = %existing.id, "Catalog product updated");
        }

        let variant_id = existing.variant.as_ref().map(|variant| variant.id.clone());
        let update = InventoryUpdate::from_product(product, variant_id);
        let (inventory, inventory_error) = match self.reconciler.reconcile_one(&update, locations).await {
            Ok(outcome) => (Some(outcome), None),
            Err(e) => {
                error!(sku = %product.sku, error = %format!("{e:#}"), "Inventory update failed");
                (None, Some(format!("{e:#}")))
            }
        };

        Ok(RowOutcome {
            catalog_product_id: existing.id,
            patch: detection.patch,
            patch_applied,
            images_uploaded: upload.uploaded_count(),
            image_failures: upload.failed_slots,
            missing_mandatory: detection.missing_mandatory,
            inventory,
            inventory_error,
        })
    }
}
