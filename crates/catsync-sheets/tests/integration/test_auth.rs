//! Service account token exchange and caching

use catsync_sheets::client::SheetsClient;
use catsync_sheets::SheetsError;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{self, SPREADSHEET_ID};

#[tokio::test]
async fn test_token_is_exchanged_once_and_reused() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains(
            "grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer",
        ))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.test-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(header("authorization", "Bearer ya29.test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "values": [["SKU"]]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = SheetsClient::new(common::service_account(&server), common::TIMEOUT)
        .unwrap()
        .with_base_url(server.uri());
    client.get_values(SPREADSHEET_ID, "Products!A1:Y10").await.unwrap();
    client.get_values(SPREADSHEET_ID, "Products!A1:Y10").await.unwrap();
}

#[tokio::test]
async fn test_short_lived_token_is_refreshed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "ya29.short",
            "expires_in": 30
        })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let client = SheetsClient::new(common::service_account(&server), common::TIMEOUT)
        .unwrap()
        .with_base_url(server.uri());
    client.get_values(SPREADSHEET_ID, "Products!A1:Y10").await.unwrap();
    client.get_values(SPREADSHEET_ID, "Products!A1:Y10").await.unwrap();
}

#[tokio::test]
async fn test_rejected_assertion_is_token_exchange_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&server)
        .await;

    let client = SheetsClient::new(common::service_account(&server), common::TIMEOUT)
        .unwrap()
        .with_base_url(server.uri());
    let err = client
        .get_values(SPREADSHEET_ID, "Products!A1:Y10")
        .await
        .unwrap_err();
    assert!(matches!(err, SheetsError::TokenExchange(msg) if msg.contains("invalid_grant")));
}
