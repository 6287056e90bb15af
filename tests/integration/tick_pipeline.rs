//! Full ticks: mocked providers, snapshot file on disk, mocked notifier
//!
//! These tests verify that:
//! - A first run notifies with every metric and writes the snapshot
//! - A later run only reports metrics past their threshold
//! - Unreadable previous snapshots are treated as a first run
//! - A failed save is reported but does not abort the tick

use assert_matches::assert_matches;
use macro_pulse::config::{Config, NotifierConfig, Webhook};
use macro_pulse::delta::{DeltaEngine, ThresholdTable};
use macro_pulse::notify::{self, NotifyOutcome};
use macro_pulse::resolver::MetricResolver;
use macro_pulse::storage::json::JsonFileStore;
use macro_pulse::tick::{Tick, TickOutcome};
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::{mount_all_providers, mount_json, test_config};

async fn mount_hook(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

fn config_with_hook(server: &MockServer) -> Config {
    Config {
        notifier: Some(NotifierConfig::Webhook(Webhook {
            url: format!("{}/hook", server.uri()),
        })),
        ..test_config(server)
    }
}

async fn run(config: &Config, store: &JsonFileStore) -> TickOutcome {
    let resolver = MetricResolver::from_config(config).unwrap();
    let engine = DeltaEngine::new(ThresholdTable::with_overrides(&config.thresholds));
    let notifier = notify::from_config(config).unwrap();

    Tick::new(&resolver, store, &engine, notifier.as_ref()).run().await
}

async fn hook_messages(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == "/hook")
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            body["message"].as_str().unwrap().to_string()
        })
        .collect()
}

#[tokio::test]
async fn test_first_run_writes_snapshot_and_notifies() {
    let mock_server = MockServer::start().await;
    mount_all_providers(&mock_server).await;
    mount_hook(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("dashboard_data.json");
    let store = JsonFileStore::new(&snapshot_path);

    let outcome = run(&config_with_hook(&mock_server), &store).await;

    assert!(outcome.persisted);
    assert!(outcome.evaluation.first_run);
    assert_eq!(outcome.notification, NotifyOutcome::Sent);
    assert_eq!(outcome.message.lines, 6);

    let messages = hook_messages(&mock_server).await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("\nRegime: 🟢 RISK ON\n"));
    assert!(messages[0].contains("• Bitcoin Price: $97,000\n"));
    assert!(messages[0].contains("• Stablecoin Market Cap: $200.00B"));
    assert!(messages[0].contains("• Fed Net Liquidity: $6000.0B"));

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&snapshot_path).unwrap()).unwrap();
    assert_eq!(written["summary"], json!({"total_metrics": 6, "successful": 6, "failed": 0}));
    assert_eq!(written["metrics"]["bitcoin_price"], json!(97000.0));
    assert!(written["metrics"]["us_10y_yield_7d_change"].is_number());
    assert!(written["metrics"].get("fed_net_liquidity_7d_change").is_none());
    assert!(written["timestamp_unix"].is_i64());
}

#[tokio::test]
async fn test_second_run_reports_only_changes() {
    let mock_server = MockServer::start().await;
    mount_all_providers(&mock_server).await;
    mount_hook(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("dashboard_data.json"));
    let config = config_with_hook(&mock_server);

    run(&config, &store).await;

    // bitcoin moves by about 1.03%, everything else stays put
    mock_server.reset().await;
    mount_json(&mock_server, "/api/v3/simple/price", json!({"bitcoin": {"usd": 98000.0}})).await;
    mount_all_providers(&mock_server).await;
    mount_hook(&mock_server).await;

    let outcome = run(&config, &store).await;

    assert!(outcome.persisted);
    assert!(!outcome.evaluation.first_run);
    assert_eq!(outcome.notification, NotifyOutcome::Sent);
    assert_eq!(outcome.message.lines, 1);

    let messages = hook_messages(&mock_server).await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].ends_with("📈 Market\n• Bitcoin Price: $98,000 (🟢 +1.03%)"));
}

#[tokio::test]
async fn test_unchanged_run_sends_nothing() {
    let mock_server = MockServer::start().await;
    mount_all_providers(&mock_server).await;
    mount_hook(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("dashboard_data.json"));
    let config = config_with_hook(&mock_server);

    run(&config, &store).await;
    let outcome = run(&config, &store).await;

    assert!(outcome.persisted);
    assert_matches!(outcome.notification, NotifyOutcome::Skipped(_));
    assert_eq!(hook_messages(&mock_server).await.len(), 1);
}

#[tokio::test]
async fn test_legacy_snapshot_is_compared() {
    let mock_server = MockServer::start().await;
    mount_all_providers(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("dashboard_data.json");
    std::fs::write(
        &snapshot_path,
        json!({
            "timestamp": "2025-01-01T12:00:00.123456",
            "timestamp_unix": 1735732800,
            "metrics": {
                "us_10y_yield": 4.25,
                "bitcoin_price": 100000.0,
                "stablecoin_mcap": null,
                "rwa_tvl": 0.0,
                "usdt_dominance": 5.0,
                "fed_net_liquidity": 6000.0
            },
            "summary": {"total_metrics": 6, "successful": 5, "failed": 1}
        })
        .to_string(),
    )
    .unwrap();

    let outcome = run(&test_config(&mock_server), &JsonFileStore::new(&snapshot_path)).await;

    assert!(!outcome.evaluation.first_run);
    assert!(outcome.evaluation.should_notify);
    assert!(outcome.message.text.contains("• Bitcoin Price: $97,000 (🔴 -3.00%)"));
    // no usable prior for these two, plain values
    assert!(outcome.message.text.contains("• Stablecoin Market Cap: $200.00B\n"));
    assert!(outcome.message.text.ends_with("• Total RWA TVL: $10.00B"));
    assert_eq!(
        outcome.notification,
        NotifyOutcome::Skipped("no notifier configured".to_string())
    );
}

#[tokio::test]
async fn test_corrupted_snapshot_is_first_run() {
    let mock_server = MockServer::start().await;
    mount_all_providers(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let snapshot_path = dir.path().join("dashboard_data.json");
    std::fs::write(&snapshot_path, "{ not json").unwrap();

    let outcome = run(&test_config(&mock_server), &JsonFileStore::new(&snapshot_path)).await;

    assert!(outcome.evaluation.first_run);
    assert!(outcome.persisted);

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&snapshot_path).unwrap()).unwrap();
    assert_eq!(written["summary"]["successful"], json!(6));
}

#[tokio::test]
async fn test_unwritable_snapshot_is_reported() {
    let mock_server = MockServer::start().await;
    mount_all_providers(&mock_server).await;

    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("missing").join("dashboard_data.json"));

    let outcome = run(&test_config(&mock_server), &store).await;

    assert!(!outcome.persisted);
    assert_eq!(outcome.snapshot.summary.successful, 6);
}
