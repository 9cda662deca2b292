//! catsync Commerce - commerce backend admin API adapter
//!
//! Talks to the backend's admin HTTP API with a secret API key and provides:
//! - [`catalog::CommerceCatalog`] - product lookup by SKU and patch application
//! - [`inventory::CommerceInventory`] - inventory items, levels and stock locations
//!
//! Category, collection and tag names from the sheet are resolved to backend
//! ids here; the core only deals in names.

pub mod catalog;
pub mod client;
pub mod inventory;

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by the admin API
#[derive(Debug, Error)]
pub enum CommerceError {
    /// The API key is missing or invalid
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A concurrent modification or duplicate value was rejected
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests { retry_after: Duration },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request rejected ({status}): {message}")]
    BadRequest { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A category or collection named in the sheet does not exist
    #[error("Unknown {kind} '{name}'")]
    UnknownReference { kind: &'static str, name: String },
}

impl CommerceError {
    /// Maps a non-success status and its body to an error
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(body),
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            StatusCode::CONFLICT => Self::Conflict(body),
            s if s.is_server_error() => Self::ServerError(format!("{s}: {body}")),
            s => Self::BadRequest {
                status: s.as_u16(),
                message: body,
            },
        }
    }
}
