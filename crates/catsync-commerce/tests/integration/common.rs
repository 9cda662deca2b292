//! Shared helpers for admin API integration tests

use std::time::Duration;

use catsync_commerce::client::CommerceClient;
use wiremock::MockServer;

/// `sk_test:` in basic-auth form
pub const AUTH_HEADER: &str = "Basic c2tfdGVzdDo=";

pub async fn setup_commerce_mock() -> (MockServer, CommerceClient) {
    let server = MockServer::start().await;
    let client = CommerceClient::new(server.uri(), "sk_test", Duration::from_secs(30)).unwrap();
    (server, client)
}

/// Client whose requests give up after `timeout`
pub async fn setup_commerce_mock_with_timeout(timeout: Duration) -> (MockServer, CommerceClient) {
    let server = MockServer::start().await;
    let client = CommerceClient::new(server.uri(), "sk_test", timeout).unwrap();
    (server, client)
}

pub fn product_json() -> serde_json::Value {
    serde_json::json!({
        "product": {
            "id": "prod_1",
            "handle": "tea-cup",
            "title": "Tea Cup",
            "subtitle": "Stoneware",
            "description": "A cup.",
            "thumbnail": null,
            "images": [],
            "metadata": null,
            "categories": [],
            "collection": null,
            "tags": [{"id": "ptag_1", "value": "bestseller"}],
            "variants": [{
                "id": "variant_1",
                "sku": "A1",
                "prices": [{"amount": 12, "currency_code": "eur"}],
                "height": 90, "width": 80, "length": 80, "weight": 240,
                "hs_code": "6912", "mid_code": "MID1", "origin_country": "pt",
                "ean": "5601234567890"
            }]
        }
    })
}
