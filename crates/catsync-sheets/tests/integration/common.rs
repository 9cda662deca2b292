//! Shared helpers for Sheets API integration tests

use std::time::Duration;

use catsync_sheets::auth::{ServiceAccountAuth, ServiceAccountKey};
use catsync_sheets::client::SheetsClient;
use wiremock::MockServer;

pub const SPREADSHEET_ID: &str = "sheet-test-001";

pub const TIMEOUT: Duration = Duration::from_secs(30);

pub const TEST_KEY: &str = include_str!("../fixtures/test_service_account_key.pem");

/// Starts a mock server and returns a client with a fixed token pointing at it
pub async fn setup_sheets_mock() -> (MockServer, SheetsClient) {
    let server = MockServer::start().await;
    let client = SheetsClient::with_access_token("test-access-token", server.uri(), TIMEOUT)
        .expect("client builds");
    (server, client)
}

/// Like [`setup_sheets_mock`] but requests give up after `timeout`
pub async fn setup_sheets_mock_with_timeout(timeout: Duration) -> (MockServer, SheetsClient) {
    let server = MockServer::start().await;
    let client = SheetsClient::with_access_token("test-access-token", server.uri(), timeout)
        .expect("client builds");
    (server, client)
}

/// A service account whose token endpoint is `{server}/token`
pub fn service_account(server: &MockServer) -> ServiceAccountAuth {
    let json = serde_json::json!({
        "type": "service_account",
        "client_email": "catsync@test-project.iam.gserviceaccount.com",
        "private_key": TEST_KEY,
        "token_uri": format!("{}/token", server.uri()),
    })
    .to_string();
    ServiceAccountAuth::new(ServiceAccountKey::from_json(&json).expect("valid key json"), TIMEOUT)
        .expect("auth builds")
}
