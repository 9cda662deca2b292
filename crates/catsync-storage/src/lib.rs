//! catsync Storage - S3-compatible object storage adapter
//!
//! Stores product images under deterministic keys and serves them from a
//! public base URL. Works with any S3-compatible endpoint (path-style
//! addressing).

pub mod s3;

pub use s3::S3ObjectStore;

use thiserror::Error;

/// Errors returned by the object store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to upload {key}: {message}")]
    Upload { key: String, message: String },

    #[error("Failed to list objects under {prefix}: {message}")]
    List { prefix: String, message: String },

    #[error("Failed to delete objects: {0}")]
    Delete(String),

    /// More keys than a single delete request accepts
    #[error("Delete batch of {0} keys exceeds the limit")]
    BatchTooLarge(usize),

    /// A request could not be built from the given values
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}
