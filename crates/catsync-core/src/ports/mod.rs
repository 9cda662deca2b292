//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`ISheetSource`] - Spreadsheet range reads and batched cell writes
//! - [`IImageFetcher`] - Binary image downloads over HTTP
//! - [`IObjectStore`] - Object storage for uploaded product images
//! - [`IProductCatalog`] - Product reads and patch writes on the commerce backend
//! - [`IInventoryService`] - Inventory item and level operations
//! - [`IStockLocations`] - Stock location listing
//!
//! ## Design Notes
//!
//! - Ports use `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification.
//! - Each component depends only on the narrow ports it actually calls.

pub mod catalog;
pub mod image_fetcher;
pub mod inventory;
pub mod object_store;
pub mod sheet_source;

pub use catalog::IProductCatalog;
pub use image_fetcher::{FetchedImage, IImageFetcher};
pub use inventory::{IInventoryService, IStockLocations};
pub use object_store::{IObjectStore, DELETE_BATCH_LIMIT};
pub use sheet_source::{cell_ref, quote_tab, CellWrite, ISheetSource};
