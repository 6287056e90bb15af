//! Yahoo Finance chart API, used as market-data fallback

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, header::USER_AGENT};
use serde::Deserialize;
use tracing::instrument;

use super::{MetricSource, Sample, fetch_json};

/// 10-year treasury yield index
pub const TNX: &str = "^TNX";
pub const BTC_USD: &str = "BTC-USD";

/// The chart API rejects requests without a browser user agent.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Last non-null close of the first result.
fn last_close(response: &ChartResponse) -> Option<f64> {
    response
        .chart
        .result
        .as_ref()?
        .first()?
        .indicators
        .quote
        .first()?
        .close
        .iter()
        .rev()
        .flatten()
        .copied()
        .find(|close| close.is_finite())
}

#[derive(Debug, Clone)]
pub struct YahooChart {
    base_url: String,
    symbol: &'static str,
}

impl YahooChart {
    pub fn new(base_url: impl ToString, symbol: &'static str) -> Self {
        Self {
            base_url: base_url.to_string(),
            symbol,
        }
    }
}

#[async_trait]
impl MetricSource for YahooChart {
    fn name(&self) -> String {
        format!("yfinance ({})", self.symbol)
    }

    fn provider(&self) -> &'static str {
        "yfinance"
    }

    #[instrument(skip_all, fields(symbol = self.symbol))]
    async fn fetch(&self, client: &Client) -> Result<Sample> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.base_url,
            self.symbol.replace('^', "%5E")
        );
        let request = client
            .get(&url)
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .query(&[("range", "5d"), ("interval", "1d")]);

        let response: ChartResponse = fetch_json(request)
            .await
            .with_context(|| format!("yfinance {}", self.symbol))?;

        let close = last_close(&response).context("no close price")?;
        Ok(Sample::new(close))
    }
}
