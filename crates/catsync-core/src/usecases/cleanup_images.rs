//! Legacy image sweep
//!
//! Earlier uploads were stored as `{sku}-{n}-{epoch millis}.jpg`, creating a
//! new object on every sync. This sweep finds those keys under `products/`
//! and deletes them in batches; current deterministic keys are never matched.

use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::Serialize;
use tracing::{error, info};

use crate::ports::{IObjectStore, DELETE_BATCH_LIMIT};

/// Prefix holding every product image
pub const PRODUCT_IMAGE_PREFIX: &str = "products/";

const SAMPLE_SIZE: usize = 5;

fn legacy_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-\d+-\d{13,}\.jpg$").expect("legacy key pattern is valid"))
}

/// Returns true for keys written under the timestamped naming scheme
pub fn is_legacy_key(key: &str) -> bool {
    legacy_key_pattern().is_match(key)
}

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub scanned: usize,
    pub matched: usize,
    pub deleted: usize,
    pub failed_batches: usize,
    /// Up to five matched keys, for the log
    pub sample: Vec<String>,
    pub dry_run: bool,
}

/// Deletes legacy timestamped image objects
pub struct LegacyImageSweeper {
    store: Arc<dyn IObjectStore + Send + Sync>,
    dry_run: bool,
}

impl LegacyImageSweeper {
    pub fn new(store: Arc<dyn IObjectStore + Send + Sync>) -> Self {
        Self {
            store,
            dry_run: false,
        }
    }

    /// Lists matching keys without deleting them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Runs the sweep
    ///
    /// # Errors
    ///
    /// Fails only when the key listing fails. A failed delete batch is logged
    /// and counted, and the next batch is still attempted.
    pub async fn sweep(&self) -> anyhow::Result<SweepReport> {
        let keys = self.store.list(PRODUCT_IMAGE_PREFIX).await?;
        let legacy: Vec<String> = keys.iter().filter(|k| is_legacy_key(k)).cloned().collect();

        let mut report = SweepReport {
            scanned: keys.len(),
            matched: legacy.len(),
            sample: legacy.iter().take(SAMPLE_SIZE).cloned().collect(),
            dry_run: self.dry_run,
            ..SweepReport::default()
        };

        if legacy.is_empty() {
            info!(scanned = report.scanned, "No legacy images found");
            return Ok(report);
        }

        if !self.dry_run {
            for batch in legacy.chunks(DELETE_BATCH_LIMIT) {
                match self.store.delete_many(batch).await {
                    Ok(deleted) => report.deleted += deleted,
                    Err(e) => {
                        error!(keys = batch.len(), error = %format!("{e:#}"), "Legacy image delete batch failed");
                        report.failed_batches += 1;
                    }
                }
            }
        }

        info!(
            scanned = report.scanned,
            matched = report.matched,
            deleted = report.deleted,
            sample = ?report.sample,
            dry_run = self.dry_run,
            "Legacy image sweep finished"
        );
        Ok(report)
    }
}
