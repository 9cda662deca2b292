//! catsync Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `SheetProduct`, `UploadResult`, `Patch`, `InventoryUpdate`, `BatchReport`
//! - **Use cases** - `SheetReader`, `ImageIngestionPipeline`, `ChangeDetector`,
//!   `InventoryReconciler`, `SyncStatusWriter`, `LegacyImageSweeper`
//! - **Port definitions** - Traits for adapters: `ISheetSource`, `IImageFetcher`, `IObjectStore`,
//!   `IProductCatalog`, `IInventoryService`, `IStockLocations`
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O.
//! Ports define trait interfaces that adapter crates implement.
//! Use cases orchestrate domain entities through port interfaces.

pub mod config;
pub mod domain;
pub mod ports;
pub mod usecases;
