//! catsync Sheets - Google Sheets adapter
//!
//! Provides:
//! - Service-account authentication (RS256 JWT bearer grant) with token caching
//! - Values read and batched values write against the Sheets v4 API
//! - 429 handling with `Retry-After`
//!
//! ## Modules
//!
//! - [`auth`] - service account key loading and access token exchange
//! - [`client`] - Sheets v4 HTTP client
//! - [`provider`] - [`ISheetSource`](catsync_core::ports::ISheetSource) implementation

pub mod auth;
pub mod client;
pub mod provider;

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when talking to the Sheets API
#[derive(Debug, Error)]
pub enum SheetsError {
    /// The service account key could not be read or used
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    /// The token endpoint rejected the assertion
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The service account has no access to the spreadsheet
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit still exceeded after every retry
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests { retry_after: Duration },

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Request rejected ({status}): {message}")]
    BadRequest { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The API response could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl SheetsError {
    /// Maps a non-success status and its body to an error
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(body),
            StatusCode::FORBIDDEN => Self::Forbidden(body),
            StatusCode::NOT_FOUND => Self::NotFound(body),
            s if s.is_server_error() => Self::ServerError(format!("{s}: {body}")),
            s => Self::BadRequest {
                status: s.as_u16(),
                message: body,
            },
        }
    }
}
