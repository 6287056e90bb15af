//! Provider clients feeding the metric resolver
//!
//! Each provider family lives in its own module and exposes one or more
//! `MetricSource` implementations. A source performs the HTTP calls for one
//! metric, normalizes the payload to a single number and reports any problem
//! (network, status, parse, missing field, empty aggregate) as an error.
//! The resolver treats every error the same way: this source is unusable for
//! this attempt.
//!
//! ## Providers
//!
//! - **FRED**: treasury yield and the three Fed balance sheet series
//! - **Yahoo chart**: market-data fallback for the yield and Bitcoin
//! - **CoinGecko**: Bitcoin price, USDT and global market cap
//! - **DefiLlama**: stablecoin supply and RWA protocol TVL

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::trace;

pub mod coingecko;
pub mod defillama;
pub mod fred;
pub mod yahoo;

/// A normalized value produced by one source.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub value: f64,

    /// 7-period trailing change in percent
    pub seven_day_change: Option<f64>,

    /// Provenance override, e.g. when the source wants to report how many
    /// entries contributed to an aggregate
    pub provenance: Option<String>,
}

impl Sample {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            seven_day_change: None,
            provenance: None,
        }
    }

    pub fn with_change(mut self, change: Option<f64>) -> Self {
        self.seven_day_change = change;
        self
    }

    pub fn with_provenance(mut self, provenance: impl ToString) -> Self {
        self.provenance = Some(provenance.to_string());
        self
    }
}

/// One way of obtaining a metric from one provider.
///
/// Implementations must be stateless apart from their configuration so the
/// same source can be retried any number of times.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Human readable provenance, shown in the report.
    fn name(&self) -> String;

    /// Short provider name used when every source of a metric failed.
    fn provider(&self) -> &'static str;

    async fn fetch(&self, client: &Client) -> Result<Sample>;
}

/// Send a request, require a success status and decode the JSON body.
pub(crate) async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request.send().await.context("request failed")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("HTTP error: {status}");
    }

    let body = response
        .text()
        .await
        .context("failed to read response body")?;

    trace!("received {} bytes", body.len());

    serde_json::from_str(&body).context("unexpected payload")
}

/// Percent change between the latest value and the one six periods earlier.
///
/// Requires at least seven points; a zero base yields `None`.
pub fn seven_period_change(series: &[f64]) -> Option<f64> {
    if series.len() < 7 {
        return None;
    }

    let latest = *series.last()?;
    let base = series[series.len() - 7];
    if base == 0.0 {
        return None;
    }

    Some((latest - base) / base * 100.0)
}
