//! Admin API HTTP client
//!
//! Wraps `reqwest::Client` with the secret-key authentication scheme, JSON
//! helpers and automatic retry on HTTP 429.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::CommerceError;

/// Default retry-after duration when the header is missing
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Maximum number of retries for 429 responses
const DEFAULT_MAX_RETRIES: u32 = 5;

/// HTTP client for the commerce admin API
#[derive(Clone)]
pub struct CommerceClient {
    client: Client,
    base_url: String,
    api_key: String,
    max_retries: u32,
}

impl CommerceClient {
    /// Creates a client for the backend at `base_url`
    ///
    /// The secret key is sent as the basic-auth user name with an empty
    /// password. Every request is abandoned after `timeout`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, CommerceError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            max_retries: DEFAULT_MAX_RETRIES,
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, CommerceError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| CommerceError::InvalidResponse(format!("bad URL for {path}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn execute_with_retry<F>(&self, path: &str, build: F) -> Result<Response, CommerceError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        for attempt in 0..=self.max_retries {
            let response = build(&self.client)
                .basic_auth(&self.api_key, Option::<&str>::None)
                .send()
                .await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_RETRY_AFTER);

                if attempt >= self.max_retries {
                    warn!(path, attempts = attempt + 1, "429 retry limit exhausted");
                    return Err(CommerceError::TooManyRequests { retry_after });
                }
                info!(
                    path,
                    attempt,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "Received 429, backing off"
                );
                tokio::time::sleep(retry_after).await;
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(CommerceError::from_status(status, body));
            }
            return Ok(response);
        }

        Err(CommerceError::TooManyRequests {
            retry_after: DEFAULT_RETRY_AFTER,
        })
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, CommerceError> {
        response
            .json()
            .await
            .map_err(|e| CommerceError::InvalidResponse(format!("{path}: {e}")))
    }

    /// `GET {path}?{query}` decoded as JSON
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CommerceError> {
        let url = self.url(path, query)?;
        debug!(%url, "GET");
        let response = self
            .execute_with_retry(path, |client| client.get(url.clone()))
            .await?;
        Self::decode(path, response).await
    }

    /// `POST {path}` with a JSON body, response decoded as JSON
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, CommerceError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path, &[])?;
        debug!(%url, "POST");
        let response = self
            .execute_with_retry(path, |client| client.post(url.clone()).json(body))
            .await?;
        Self::decode(path, response).await
    }
}
