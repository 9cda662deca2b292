//! Google Sheets v4 API client
//!
//! Wraps `reqwest::Client` with bearer authentication, URL construction and
//! automatic retry on HTTP 429.

use std::{sync::Arc, time::Duration};

use catsync_core::ports::CellWrite;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::auth::ServiceAccountAuth;
use crate::SheetsError;

/// Base URL of the Sheets API
const SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

/// Default retry-after duration when the header is missing
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Maximum number of retries for 429 responses
const DEFAULT_MAX_RETRIES: u32 = 5;

// ============================================================================
// Sheets API payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateRequest<'a> {
    value_input_option: &'static str,
    data: Vec<RangeData<'a>>,
}

#[derive(Debug, Serialize)]
struct RangeData<'a> {
    range: &'a str,
    values: [[&'a str; 1]; 1],
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateResponse {
    #[serde(default)]
    total_updated_cells: usize,
}

fn cell_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parses a `Retry-After` header given in seconds or as an HTTP date
pub fn parse_retry_after(value: &str, default: Duration) -> Duration {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Duration::from_secs(seconds);
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value.trim()) {
        let wait = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
        if let Ok(secs) = u64::try_from(wait.num_seconds()) {
            if secs <= 3600 {
                return Duration::from_secs(secs);
            }
        }
    }

    warn!(value, "Could not parse Retry-After header, using default");
    default
}

// ============================================================================
// SheetsClient
// ============================================================================

enum TokenSource {
    Static(String),
    ServiceAccount(Arc<ServiceAccountAuth>),
}

/// HTTP client for the Sheets v4 values API
pub struct SheetsClient {
    client: Client,
    base_url: String,
    tokens: TokenSource,
    max_retries: u32,
}

impl SheetsClient {
    /// Creates a client authenticating as a service account
    ///
    /// Every request is abandoned after `timeout`.
    pub fn new(auth: ServiceAccountAuth, timeout: Duration) -> Result<Self, SheetsError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: SHEETS_BASE_URL.to_string(),
            tokens: TokenSource::ServiceAccount(Arc::new(auth)),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Creates a client with a fixed access token and base URL (useful for testing)
    pub fn with_access_token(
        access_token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, SheetsError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
            tokens: TokenSource::Static(access_token.into()),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    /// Overrides the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn access_token(&self) -> Result<String, SheetsError> {
        match &self.tokens {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::ServiceAccount(auth) => auth.access_token().await,
        }
    }

    /// Builds `{base}/v4/spreadsheets/{id}/{segments..}` with each segment escaped
    fn url(&self, spreadsheet_id: &str, segments: &[&str]) -> Result<Url, SheetsError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| SheetsError::InvalidResponse(format!("bad base URL {}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::InvalidResponse(format!("base URL {} cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id])
            .extend(segments);
        Ok(url)
    }

    /// Sends a request with automatic 429 retry
    ///
    /// `build` is called once per attempt with the current access token.
    async fn execute_with_retry<F>(&self, what: &str, build: F) -> Result<Response, SheetsError>
    where
        F: Fn(&Client, &str) -> RequestBuilder,
    {
        for attempt in 0..=self.max_retries {
            let token = self.access_token().await?;
            let response = build(&self.client, &token).send().await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .map(|v| parse_retry_after(v, DEFAULT_RETRY_AFTER))
                    .unwrap_or(DEFAULT_RETRY_AFTER);

                if attempt >= self.max_retries {
                    warn!(request = what, attempts = attempt + 1, "429 retry limit exhausted");
                    return Err(SheetsError::TooManyRequests { retry_after });
                }

                info!(
                    request = what,
                    attempt,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Received 429, backing off"
                );
                tokio::time::sleep(retry_after).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(SheetsError::from_status(status, body));
            }

            if attempt > 0 {
                info!(request = what, attempt, "Request succeeded after retry");
            }
            return Ok(response);
        }

        Err(SheetsError::TooManyRequests {
            retry_after: DEFAULT_RETRY_AFTER,
        })
    }

    /// Reads a range as rows of formatted cell strings
    ///
    /// Rows are returned as the API sends them: trailing empty cells are
    /// omitted, and an empty range yields no rows.
    pub async fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, SheetsError> {
        let mut url = self.url(spreadsheet_id, &["values", range])?;
        url.query_pairs_mut()
            .append_pair("majorDimension", "ROWS")
            .append_pair("valueRenderOption", "FORMATTED_VALUE");
        debug!(range, "Reading sheet values");

        let response = self
            .execute_with_retry("values.get", |client, token| {
                client.get(url.clone()).bearer_auth(token)
            })
            .await?;

        let body: ValueRange = response
            .json()
            .await
            .map_err(|e| SheetsError::InvalidResponse(format!("values response: {e}")))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    /// Writes every cell in one `values:batchUpdate` request
    ///
    /// Values are entered as if typed by a user, so timestamps become dates.
    /// Returns the number of cells the API reports as updated.
    pub async fn batch_update_values(
        &self,
        spreadsheet_id: &str,
        writes: &[CellWrite],
    ) -> Result<usize, SheetsError> {
        let url = self.url(spreadsheet_id, &["values:batchUpdate"])?;
        let request = BatchUpdateRequest {
            value_input_option: "USER_ENTERED",
            data: writes
                .iter()
                .map(|w| RangeData {
                    range: &w.range,
                    values: [[w.value.as_str()]],
                })
                .collect(),
        };
        debug!(cells = writes.len(), "Writing sheet values");

        let response = self
            .execute_with_retry("values.batchUpdate", |client, token| {
                client.post(url.clone()).bearer_auth(token).json(&request)
            })
            .await?;

        let body: BatchUpdateResponse = response
            .json()
            .await
            .map_err(|e| SheetsError::InvalidResponse(format!("batchUpdate response: {e}")))?;
        Ok(body.total_updated_cells)
    }
}
