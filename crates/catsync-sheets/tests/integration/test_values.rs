//! Values read and batched write against a mocked Sheets API

use catsync_core::ports::{CellWrite, ISheetSource};
use catsync_sheets::provider::GoogleSheetSource;
use catsync_sheets::SheetsError;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, SPREADSHEET_ID};

#[tokio::test]
async fn test_read_range_returns_rows_as_strings() {
    let (server, client) = common::setup_sheets_mock().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-test-001/values/Products!A1:Y1000"))
        .and(query_param("valueRenderOption", "FORMATTED_VALUE"))
        .and(header("authorization", "Bearer test-access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "range": "Products!A1:Y1000",
            "majorDimension": "ROWS",
            "values": [
                ["SKU", "Title"],
                ["A1", "Tea Cup", "", "", "", 12.5, "5"],
                ["A2"]
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = GoogleSheetSource::new(client, SPREADSHEET_ID);
    let rows = source.read_range("Products!A1:Y1000").await.unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][1], "Tea Cup");
    assert_eq!(rows[1][5], "12.5");
    assert_eq!(rows[2], vec!["A2"]);
}

#[tokio::test]
async fn test_empty_range_has_no_values_field() {
    let (server, client) = common::setup_sheets_mock().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-test-001/values/Products!A1:Y1000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "range": "Products!A1:Y1000",
            "majorDimension": "ROWS"
        })))
        .mount(&server)
        .await;

    let rows = client
        .get_values(SPREADSHEET_ID, "Products!A1:Y1000")
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_forbidden_maps_to_error() {
    let (server, client) = common::setup_sheets_mock().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("The caller does not have permission"))
        .mount(&server)
        .await;

    let err = client
        .get_values(SPREADSHEET_ID, "Products!A1:Y1000")
        .await
        .unwrap_err();
    assert!(matches!(err, SheetsError::Forbidden(msg) if msg.contains("permission")));
}

#[tokio::test]
async fn test_read_retries_after_429() {
    let (server, client) = common::setup_sheets_mock().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "values": [["SKU"], ["A1", "Tea Cup"]]
        })))
        .mount(&server)
        .await;

    let rows = client
        .get_values(SPREADSHEET_ID, "Products!A1:Y1000")
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_429_retry_limit_is_bounded() {
    let (server, client) = common::setup_sheets_mock().await;
    let client = client.with_max_retries(2);

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let err = client
        .get_values(SPREADSHEET_ID, "Products!A1:Y1000")
        .await
        .unwrap_err();
    assert!(matches!(err, SheetsError::TooManyRequests { .. }));
}

#[tokio::test]
async fn test_batch_write_sends_single_request() {
    let (server, client) = common::setup_sheets_mock().await;

    Mock::given(method("POST"))
        .and(path("/v4/spreadsheets/sheet-test-001/values:batchUpdate"))
        .and(body_json(serde_json::json!({
            "valueInputOption": "USER_ENTERED",
            "data": [
                {"range": "Products!G2", "values": [["0"]]},
                {"range": "Products!X2", "values": [["tea-cup"]]},
                {"range": "Products!Y2", "values": [["2026-03-01 08:30:00"]]}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "spreadsheetId": "sheet-test-001",
            "totalUpdatedCells": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let source = GoogleSheetSource::new(client, SPREADSHEET_ID);
    source
        .batch_write(&[
            CellWrite::new("Products!G2", "0"),
            CellWrite::new("Products!X2", "tea-cup"),
            CellWrite::new("Products!Y2", "2026-03-01 08:30:00"),
        ])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_batch_write_makes_no_request() {
    let (server, client) = common::setup_sheets_mock().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let source = GoogleSheetSource::new(client, SPREADSHEET_ID);
    source.batch_write(&[]).await.unwrap();
}

#[tokio::test]
async fn test_unresponsive_api_times_out() {
    let (server, client) =
        common::setup_sheets_mock_with_timeout(std::time::Duration::from_millis(200)).await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(std::time::Duration::from_secs(5))
                .set_body_json(serde_json::json!({"values": []})),
        )
        .mount(&server)
        .await;

    let err = client
        .get_values(SPREADSHEET_ID, "Products!A1:Y1000")
        .await
        .unwrap_err();
    assert!(matches!(err, SheetsError::NetworkError(e) if e.is_timeout()));
}
