//! FRED (Federal Reserve Economic Data) sources
//!
//! All series are queried over the same trailing window so the 7-period
//! change can be derived from a single request per series.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{MetricSource, Sample, fetch_json, seven_period_change};

/// 10-year treasury constant maturity rate
pub const DGS10: &str = "DGS10";
/// Fed total assets
pub const WALCL: &str = "WALCL";
/// Treasury general account
pub const WTREGEN: &str = "WTREGEN";
/// Overnight reverse repo
pub const RRPONTSYD: &str = "RRPONTSYD";

/// Days of history requested; enough for seven business-day observations.
const WINDOW_DAYS: i64 = 14;

#[derive(Debug, Deserialize)]
struct Observations {
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    value: String,
}

/// Values in chronological order; FRED marks missing observations with ".".
fn parse_observations(observations: &Observations) -> Vec<f64> {
    observations
        .observations
        .iter()
        .filter_map(|observation| observation.value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .collect()
}

#[derive(Debug, Clone)]
pub struct FredClient {
    base_url: String,
    api_key: Option<String>,
}

impl FredClient {
    pub fn new(base_url: impl ToString, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key,
        }
    }

    #[instrument(skip(self, client))]
    pub async fn series(&self, client: &Client, series_id: &str) -> Result<Vec<f64>> {
        let Some(api_key) = &self.api_key else {
            bail!("FRED API key not configured");
        };

        let end = Utc::now().date_naive();
        let start = end - chrono::Duration::days(WINDOW_DAYS);
        let (start, end) = (start.to_string(), end.to_string());

        let url = format!("{}/fred/series/observations", self.base_url);
        let request = client.get(&url).query(&[
            ("series_id", series_id),
            ("api_key", api_key.as_str()),
            ("file_type", "json"),
            ("observation_start", start.as_str()),
            ("observation_end", end.as_str()),
        ]);

        let observations: Observations = fetch_json(request)
            .await
            .with_context(|| format!("FRED {series_id}"))?;

        let values = parse_observations(&observations);
        if values.is_empty() {
            bail!("FRED {series_id}: no observations");
        }

        debug!("FRED {series_id}: {} observations", values.len());
        Ok(values)
    }
}

/// A single FRED series, latest observation as the value.
#[derive(Debug, Clone)]
pub struct FredSeries {
    fred: FredClient,
    series_id: &'static str,
}

impl FredSeries {
    pub fn new(fred: FredClient, series_id: &'static str) -> Self {
        Self { fred, series_id }
    }
}

#[async_trait]
impl MetricSource for FredSeries {
    fn name(&self) -> String {
        format!("FRED API ({})", self.series_id)
    }

    fn provider(&self) -> &'static str {
        "FRED"
    }

    async fn fetch(&self, client: &Client) -> Result<Sample> {
        let series = self.fred.series(client, self.series_id).await?;
        let latest = *series.last().context("empty series")?;

        Ok(Sample::new(latest).with_change(seven_period_change(&series)))
    }
}

/// `WALCL - WTREGEN - RRPONTSYD`, all three from the same window.
#[derive(Debug, Clone)]
pub struct FredNetLiquidity {
    fred: FredClient,
}

impl FredNetLiquidity {
    pub fn new(fred: FredClient) -> Self {
        Self { fred }
    }
}

#[async_trait]
impl MetricSource for FredNetLiquidity {
    fn name(&self) -> String {
        "FRED API".to_string()
    }

    fn provider(&self) -> &'static str {
        "FRED"
    }

    async fn fetch(&self, client: &Client) -> Result<Sample> {
        let (walcl, tga, rrp) = futures::try_join!(
            self.fred.series(client, WALCL),
            self.fred.series(client, WTREGEN),
            self.fred.series(client, RRPONTSYD),
        )?;

        net_liquidity(&walcl, &tga, &rrp)
    }
}

/// Combine the three balance sheet series. All of them must have data.
pub fn net_liquidity(walcl: &[f64], tga: &[f64], rrp: &[f64]) -> Result<Sample> {
    let (Some(w), Some(t), Some(r)) = (walcl.last(), tga.last(), rrp.last()) else {
        bail!("incomplete liquidity series");
    };
    let net = w - t - r;

    let change = if walcl.len() >= 7 && tga.len() >= 7 && rrp.len() >= 7 {
        let old = walcl[walcl.len() - 7] - tga[tga.len() - 7] - rrp[rrp.len() - 7];
        (old != 0.0).then(|| (net - old) / old * 100.0)
    } else {
        None
    };

    Ok(Sample::new(net).with_change(change))
}
