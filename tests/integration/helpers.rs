//! Mock provider payloads shared by the integration tests

use macro_pulse::config::{Config, Endpoints, RetryConfig};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config pointing every provider at the mock server, with no backoff.
pub fn test_config(server: &MockServer) -> Config {
    Config {
        fred_api_key: Some("test-key".to_string()),
        retry: RetryConfig {
            max_attempts: 2,
            backoff_secs: 0,
        },
        endpoints: Endpoints::all(&server.uri()),
        ..Config::default()
    }
}

pub fn fred_body(values: &[&str]) -> Value {
    let observations: Vec<Value> = values
        .iter()
        .enumerate()
        .map(|(day, value)| json!({"date": format!("2025-01-{:02}", day + 1), "value": value}))
        .collect();
    json!({ "observations": observations })
}

pub fn chart_body(closes: &[Option<f64>]) -> Value {
    json!({
        "chart": {
            "result": [{ "indicators": { "quote": [{ "close": closes }] } }],
            "error": null
        }
    })
}

pub async fn mount_fred(server: &MockServer, series_id: &str, values: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/fred/series/observations"))
        .and(query_param("series_id", series_id))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fred_body(values)))
        .mount(server)
        .await;
}

pub async fn mount_chart(server: &MockServer, symbol_pattern: &str, closes: &[Option<f64>]) {
    Mock::given(method("GET"))
        .and(path_regex(format!("^/v8/finance/chart/{symbol_pattern}$")))
        .respond_with(ResponseTemplate::new(200).set_body_json(chart_body(closes)))
        .mount(server)
        .await;
}

pub async fn mount_json(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub async fn mount_status(server: &MockServer, route: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

/// Every provider answering with plausible data.
///
/// Resulting values: yield 4.25, bitcoin 97000, stablecoins 200B,
/// RWA 10B over 3 protocols, dominance 5%, net liquidity 6000.
pub async fn mount_all_providers(server: &MockServer) {
    mount_fred(
        server,
        "DGS10",
        &["4.10", ".", "4.15", "4.20", "4.22", "4.18", "4.21", "4.25"],
    )
    .await;
    mount_fred(server, "WALCL", &["6900", "7000"]).await;
    mount_fred(server, "WTREGEN", &["700", "700"]).await;
    mount_fred(server, "RRPONTSYD", &["250", "300"]).await;

    mount_json(server, "/api/v3/simple/price", json!({"bitcoin": {"usd": 97000.0}})).await;
    mount_json(
        server,
        "/api/v3/coins/tether",
        json!({"id": "tether", "market_data": {"market_cap": {"usd": 150e9, "eur": 140e9}}}),
    )
    .await;
    mount_json(
        server,
        "/api/v3/global",
        json!({"data": {"total_market_cap": {"usd": 3e12}}}),
    )
    .await;

    mount_json(
        server,
        "/stablecoins",
        json!({"peggedAssets": [
            {"symbol": "USDT", "circulating": {"peggedUSD": 150e9}},
            {"symbol": "USDC", "circulating": {"peggedUSD": 50e9}},
            {"symbol": "EURC", "circulating": {"peggedEUR": 1e8}}
        ]}),
    )
    .await;
    mount_json(
        server,
        "/protocols",
        json!([
            {"name": "Ondo", "category": "RWA", "tvl": 6e9},
            {"name": "Maple", "category": "RWA Lending", "tvl": 3e9},
            {"name": "Centrifuge", "category": "Real World Assets", "tvl": 1e9},
            {"name": "Uniswap", "category": "Dexes", "tvl": 5e9},
            {"name": "Ghost", "category": "RWA", "tvl": null}
        ]),
    )
    .await;
}
