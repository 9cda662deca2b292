//! catsync Sync - Batch driver and image fetcher
//!
//! Provides:
//! - [`engine::SyncEngine`], which runs one sheet-to-catalog batch
//! - [`fetcher::HttpImageFetcher`], the `reqwest` adapter for image downloads
//!
//! The engine processes rows sequentially. Per-row failures end up in the
//! returned `BatchReport`; only a failed sheet read aborts the batch.

pub mod engine;
pub mod fetcher;

pub use engine::{SyncEngine, SyncPorts};
pub use fetcher::HttpImageFetcher;

use thiserror::Error;

/// Errors that abort a whole batch
#[derive(Debug, Error)]
pub enum SyncError {
    /// The product sheet could not be read; there is nothing to reconcile
    #[error("Failed to read product sheet: {0}")]
    SheetRead(String),
}
