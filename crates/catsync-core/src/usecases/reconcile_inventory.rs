//! Inventory reconciliation use case
//!
//! Applies restock quantities additively and keeps the descriptive attributes
//! of inventory items in line with the sheet. A location name that matches no
//! known stock location skips the update; it is never redirected to the
//! default location.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};

use crate::domain::{
    InventoryItem, InventoryItemChanges, InventoryOutcome, InventorySkip, InventoryUpdate,
    StockLocation,
};
use crate::ports::{IInventoryService, IStockLocations};

/// Resolves the target location of an update
///
/// A named location matches case-insensitively and exactly; no name means the
/// first known location.
pub fn resolve_location<'a>(
    requested: Option<&str>,
    locations: &'a [StockLocation],
) -> std::result::Result<&'a StockLocation, InventorySkip> {
    let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) else {
        return locations.first().ok_or(InventorySkip::NoLocations);
    };

    let wanted = requested.to_lowercase();
    locations
        .iter()
        .find(|location| location.name.trim().to_lowercase() == wanted)
        .ok_or_else(|| InventorySkip::UnknownLocation {
            requested: requested.to_string(),
            available: locations.iter().map(|l| l.name.clone()).collect(),
        })
}

/// Attribute changes needed to bring `item` in line with `update`
///
/// Only values present in the sheet are compared; nothing is cleared.
fn item_changes(update: &InventoryUpdate, item: &InventoryItem) -> InventoryItemChanges {
    fn differs(sheet: Option<f64>, current: Option<f64>) -> Option<f64> {
        sheet.filter(|v| current.map_or(true, |c| (c - v).abs() > 1e-6))
    }
    fn differs_text(sheet: Option<&String>, current: Option<&String>) -> Option<String> {
        sheet.filter(|v| current != Some(*v)).cloned()
    }

    InventoryItemChanges {
        title: (item.title.as_deref() != Some(update.title.as_str())).then(|| update.title.clone()),
        height_mm: differs(update.dimensions.height_mm, item.dimensions.height_mm),
        width_mm: differs(update.dimensions.width_mm, item.dimensions.width_mm),
        length_mm: differs(update.dimensions.length_mm, item.dimensions.length_mm),
        weight_g: differs(update.weight_g, item.weight_g),
        hs_code: differs_text(update.codes.hs_code.as_ref(), item.codes.hs_code.as_ref()),
        mid_code: differs_text(update.codes.mid_code.as_ref(), item.codes.mid_code.as_ref()),
        origin_country: update.codes.origin_country.as_ref().filter(|origin| {
            !item
                .codes
                .origin_country
                .as_ref()
                .is_some_and(|current| current.eq_ignore_ascii_case(origin))
        }).cloned(),
    }
}

/// Reconciles inventory items and levels
pub struct InventoryReconciler {
    inventory: Arc<dyn IInventoryService + Send + Sync>,
    locations: Arc<dyn IStockLocations + Send + Sync>,
    dry_run: bool,
}

impl InventoryReconciler {
    pub fn new(
        inventory: Arc<dyn IInventoryService + Send + Sync>,
        locations: Arc<dyn IStockLocations + Send + Sync>,
    ) -> Self {
        Self {
            inventory,
            locations,
            dry_run: false,
        }
    }

    /// Plans every update without writing anything
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Lists the known stock locations, in backend order
    pub async fn load_locations(&self) -> Result<Vec<StockLocation>> {
        let locations = self
            .locations
            .list_locations()
            .await
            .context("Failed to list stock locations")?;
        debug!(count = locations.len(), "Loaded stock locations");
        Ok(locations)
    }

    /// Reconciles a batch of updates, one SKU at a time
    ///
    /// A failure for one SKU is logged and recorded; the remaining SKUs are
    /// still processed.
    pub async fn reconcile(
        &self,
        updates: &[InventoryUpdate],
        locations: &[StockLocation],
    ) -> Vec<(String, Result<InventoryOutcome>)> {
        let mut outcomes = Vec::with_capacity(updates.len());
        for update in updates {
            let outcome = self.reconcile_one(update, locations).await;
            if let Err(e) = &outcome {
                error!(sku = %update.sku, error = %format!("{e:#}"), "Inventory update failed");
            }
            outcomes.push((update.sku.clone(), outcome));
        }
        outcomes
    }

    /// Reconciles a single SKU
    pub async fn reconcile_one(
        &self,
        update: &InventoryUpdate,
        locations: &[StockLocation],
    ) -> Result<InventoryOutcome> {
        let location = match resolve_location(update.location_name.as_deref(), locations) {
            Ok(location) => location,
            Err(skip) => {
                match &skip {
                    InventorySkip::UnknownLocation {
                        requested,
                        available,
                    } => error!(
                        sku = %update.sku,
                        location = %requested,
                        available = ?available,
                        "Unknown stock location, inventory update skipped"
                    ),
                    _ => error!(sku = %update.sku, "No stock locations defined, inventory update skipped"),
                }
                return Ok(InventoryOutcome::Skipped(skip));
            }
        };

        let Some(item) = self.find_item(update).await? else {
            warn!(
                sku = %update.sku,
                "No inventory item for SKU, inventory tracking may be disabled"
            );
            return Ok(InventoryOutcome::Skipped(InventorySkip::ItemNotFound));
        };

        let changes = item_changes(update, &item);
        let attributes_updated = !changes.is_empty();
        if attributes_updated && !self.dry_run {
            self.inventory
                .update_item(&item.id, &changes)
                .await
                .with_context(|| format!("Failed to update inventory item {}", item.id))?;
        }

        let levels = self
            .inventory
            .list_levels(&item.id)
            .await
            .with_context(|| format!("Failed to list levels of inventory item {}", item.id))?;
        let previous_quantity = levels
            .iter()
            .find(|level| level.location_id == location.id)
            .map(|level| level.stocked_quantity);

        let delta = update.quantity_delta;
        if delta > 0 && !self.dry_run {
            match previous_quantity {
                Some(_) => self
                    .inventory
                    .adjust_level(&item.id, &location.id, i64::from(delta))
                    .await
                    .with_context(|| format!("Failed to adjust stock at {}", location.name))?,
                None => self
                    .inventory
                    .create_level(&item.id, &location.id, i64::from(delta))
                    .await
                    .with_context(|| format!("Failed to create stock level at {}", location.name))?,
            }
        }

        info!(
            sku = %update.sku,
            location = %location.name,
            previous = ?previous_quantity,
            delta,
            attributes_updated,
            dry_run = self.dry_run,
            "Inventory reconciled"
        );

        Ok(InventoryOutcome::Applied {
            inventory_item_id: item.id,
            location: location.name.clone(),
            previous_quantity,
            quantity_applied: delta,
            attributes_updated,
        })
    }

    async fn find_item(&self, update: &InventoryUpdate) -> Result<Option<InventoryItem>> {
        if let Some(item) = self
            .inventory
            .find_item_by_sku(&update.sku)
            .await
            .with_context(|| format!("Failed to look up inventory item for {}", update.sku))?
        {
            return Ok(Some(item));
        }

        match &update.variant_id {
            Some(variant_id) => {
                debug!(sku = %update.sku, variant_id = %variant_id, "Falling back to variant link lookup");
                self.inventory
                    .find_item_for_variant(variant_id)
                    .await
                    .with_context(|| format!("Failed to look up inventory item of variant {variant_id}"))
            }
            None => Ok(None),
        }
    }
}
