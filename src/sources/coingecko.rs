use std::collections::HashMap;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{MetricSource, Sample, fetch_json};

/// Spot price of one coin in USD via `simple/price`.
#[derive(Debug, Clone)]
pub struct CoinGeckoPrice {
    base_url: String,
    coin_id: &'static str,
}

impl CoinGeckoPrice {
    pub fn new(base_url: impl ToString, coin_id: &'static str) -> Self {
        Self {
            base_url: base_url.to_string(),
            coin_id,
        }
    }
}

#[async_trait]
impl MetricSource for CoinGeckoPrice {
    fn name(&self) -> String {
        "CoinGecko API".to_string()
    }

    fn provider(&self) -> &'static str {
        "CoinGecko"
    }

    #[instrument(skip_all, fields(coin = self.coin_id))]
    async fn fetch(&self, client: &Client) -> Result<Sample> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        let request = client
            .get(&url)
            .query(&[("ids", self.coin_id), ("vs_currencies", "usd")]);

        let prices: HashMap<String, HashMap<String, f64>> = fetch_json(request)
            .await
            .context("CoinGecko price")?;

        let price = prices
            .get(self.coin_id)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .with_context(|| format!("no usd price for {}", self.coin_id))?;

        Ok(Sample::new(price))
    }
}

#[derive(Debug, Deserialize)]
struct CoinDetails {
    market_data: MarketData,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    market_cap: HashMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct Global {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    total_market_cap: HashMap<String, f64>,
}

/// Tether market cap as a percentage of the total crypto market cap.
///
/// Needs two independent lookups; either one failing fails the metric.
#[derive(Debug, Clone)]
pub struct UsdtDominance {
    base_url: String,
}

impl UsdtDominance {
    pub fn new(base_url: impl ToString) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }

    async fn tether_market_cap(&self, client: &Client) -> Result<f64> {
        let url = format!("{}/api/v3/coins/tether", self.base_url);
        let details: CoinDetails = fetch_json(client.get(&url))
            .await
            .context("CoinGecko tether")?;

        details
            .market_data
            .market_cap
            .get("usd")
            .copied()
            .context("no tether market cap")
    }

    async fn total_market_cap(&self, client: &Client) -> Result<f64> {
        let url = format!("{}/api/v3/global", self.base_url);
        let global: Global = fetch_json(client.get(&url))
            .await
            .context("CoinGecko global")?;

        global
            .data
            .total_market_cap
            .get("usd")
            .copied()
            .context("no total market cap")
    }
}

#[async_trait]
impl MetricSource for UsdtDominance {
    fn name(&self) -> String {
        "CoinGecko API".to_string()
    }

    fn provider(&self) -> &'static str {
        "CoinGecko"
    }

    #[instrument(skip_all)]
    async fn fetch(&self, client: &Client) -> Result<Sample> {
        let (part, whole) = futures::try_join!(
            self.tether_market_cap(client),
            self.total_market_cap(client)
        )?;

        debug!("tether market cap {part}, total {whole}");
        Ok(Sample::new(dominance(part, whole)?))
    }
}

pub fn dominance(part: f64, whole: f64) -> Result<f64> {
    if whole <= 0.0 || !whole.is_finite() {
        bail!("invalid total market cap");
    }
    Ok(part / whole * 100.0)
}
