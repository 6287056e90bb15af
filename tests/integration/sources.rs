//! Metric resolution against mocked providers
//!
//! These tests verify that:
//! - Primary sources win when they answer
//! - Fallback sources are used when the primary fails
//! - A failing chain is retried as a whole
//! - Aggregates with a zero total count as failures

use macro_pulse::resolver::MetricResolver;
use macro_pulse::{MetricId, ReadingStatus};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::{mount_all_providers, mount_chart, mount_fred, mount_json, mount_status, test_config};

#[tokio::test]
async fn test_all_primary_sources() {
    let mock_server = MockServer::start().await;
    mount_all_providers(&mock_server).await;

    let resolver = MetricResolver::from_config(&test_config(&mock_server)).unwrap();
    let readings = resolver.resolve_all().await;

    let ids: Vec<MetricId> = readings.iter().map(|reading| reading.id).collect();
    assert_eq!(ids, MetricId::ALL.to_vec());
    assert!(readings.iter().all(|reading| reading.is_ok()));

    let value = |id: MetricId| readings.iter().find(|r| r.id == id).unwrap().value.unwrap();
    assert_eq!(value(MetricId::Us10yYield), 4.25);
    assert_eq!(value(MetricId::BitcoinPrice), 97_000.0);
    assert_eq!(value(MetricId::StablecoinMcap), 200e9);
    assert_eq!(value(MetricId::RwaTvl), 10e9);
    assert!((value(MetricId::UsdtDominance) - 5.0).abs() < 1e-9);
    assert_eq!(value(MetricId::FedNetLiquidity), 6000.0);

    let source = |id: MetricId| readings.iter().find(|r| r.id == id).unwrap().source.clone();
    assert_eq!(source(MetricId::Us10yYield), "FRED API (DGS10)");
    assert_eq!(source(MetricId::RwaTvl), "DefiLlama API (3 protocols)");
}

#[tokio::test]
async fn test_yield_seven_day_change() {
    let mock_server = MockServer::start().await;
    mount_fred(
        &mock_server,
        "DGS10",
        &["4.00", "4.10", "4.15", "4.20", "4.22", "4.18", "4.21", "4.20"],
    )
    .await;

    let resolver = MetricResolver::from_config(&test_config(&mock_server)).unwrap();
    let reading = resolver.resolve(MetricId::Us10yYield).await;

    // seven points back from 4.20 is 4.10
    let change = reading.seven_day_change.unwrap();
    assert!((change - (4.20 - 4.10) / 4.10 * 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_yield_falls_back_to_chart() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/fred/series/observations", 500).await;
    mount_chart(&mock_server, "%5ETNX", &[Some(4.1), Some(4.3), None]).await;

    let resolver = MetricResolver::from_config(&test_config(&mock_server)).unwrap();
    let reading = resolver.resolve(MetricId::Us10yYield).await;

    assert_eq!(reading.status, ReadingStatus::Ok);
    assert_eq!(reading.value, Some(4.3));
    assert_eq!(reading.source, "yfinance (^TNX)");
    assert_eq!(reading.seven_day_change, None);
}

#[tokio::test]
async fn test_missing_fred_key() {
    let mock_server = MockServer::start().await;
    mount_all_providers(&mock_server).await;
    mount_chart(&mock_server, "%5ETNX", &[Some(4.3)]).await;

    let mut config = test_config(&mock_server);
    config.fred_api_key = Some("YOUR_FRED_API_KEY".to_string());

    let resolver = MetricResolver::from_config(&config).unwrap();
    let yield_reading = resolver.resolve(MetricId::Us10yYield).await;
    let liquidity = resolver.resolve(MetricId::FedNetLiquidity).await;

    assert_eq!(yield_reading.source, "yfinance (^TNX)");
    assert_eq!(liquidity.value, None);
    assert_eq!(liquidity.source, "FRED");
    assert_eq!(
        liquidity.status,
        ReadingStatus::Failed("FRED API key not configured".to_string())
    );
}

#[tokio::test]
async fn test_bitcoin_falls_back_to_chart() {
    let mock_server = MockServer::start().await;
    mount_status(&mock_server, "/api/v3/simple/price", 429).await;
    mount_chart(&mock_server, "BTC-USD", &[Some(96_500.0), Some(97_250.5)]).await;

    let resolver = MetricResolver::from_config(&test_config(&mock_server)).unwrap();
    let reading = resolver.resolve(MetricId::BitcoinPrice).await;

    assert_eq!(reading.value, Some(97_250.5));
    assert_eq!(reading.source, "yfinance (BTC-USD)");
}

#[tokio::test]
async fn test_failed_chain_is_retried() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stablecoins"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_json(
        &mock_server,
        "/stablecoins",
        json!({"peggedAssets": [{"circulating": {"peggedUSD": 180e9}}]}),
    )
    .await;

    let resolver = MetricResolver::from_config(&test_config(&mock_server)).unwrap();
    let reading = resolver.resolve(MetricId::StablecoinMcap).await;

    assert!(reading.is_ok());
    assert_eq!(reading.value, Some(180e9));
}

#[tokio::test]
async fn test_zero_rwa_total_is_failure() {
    let mock_server = MockServer::start().await;
    mount_json(
        &mock_server,
        "/protocols",
        json!([
            {"name": "Aave", "category": "Lending", "tvl": 20e9},
            {"name": "Ghost", "category": "RWA", "tvl": 0.0}
        ]),
    )
    .await;

    let resolver = MetricResolver::from_config(&test_config(&mock_server)).unwrap();
    let reading = resolver.resolve(MetricId::RwaTvl).await;

    assert_eq!(reading.value, None);
    assert_eq!(reading.source, "DefiLlama");
    assert_eq!(
        reading.status,
        ReadingStatus::Failed("No RWA protocols found or tota".to_string())
    );
}

#[tokio::test]
async fn test_dominance_needs_both_lookups() {
    let mock_server = MockServer::start().await;
    mount_json(
        &mock_server,
        "/api/v3/coins/tether",
        json!({"market_data": {"market_cap": {"usd": 150e9}}}),
    )
    .await;
    mount_status(&mock_server, "/api/v3/global", 500).await;

    let resolver = MetricResolver::from_config(&test_config(&mock_server)).unwrap();
    let reading = resolver.resolve(MetricId::UsdtDominance).await;

    assert!(!reading.is_ok());
    assert_eq!(reading.value, None);
}

#[tokio::test]
async fn test_liquidity_needs_every_series() {
    let mock_server = MockServer::start().await;
    mount_fred(&mock_server, "WALCL", &["7000"]).await;
    mount_fred(&mock_server, "WTREGEN", &["700"]).await;
    // RRPONTSYD not mounted, the mock server answers 404

    let resolver = MetricResolver::from_config(&test_config(&mock_server)).unwrap();
    let reading = resolver.resolve(MetricId::FedNetLiquidity).await;

    assert_eq!(reading.value, None);
    assert!(!reading.is_ok());
}
