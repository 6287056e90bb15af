//! DefiLlama bulk listings
//!
//! Both metrics are aggregates over a listing endpoint. A zero total means the
//! listing was empty or the filter matched nothing, which is a failed fetch
//! rather than a real reading.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{MetricSource, Sample, fetch_json};

/// Protocol categories counted as real world assets.
pub const RWA_CATEGORIES: [&str; 4] = ["RWA", "RWA Lending", "Private Credit", "Real World Assets"];

#[derive(Debug, Default, Deserialize)]
pub struct StablecoinListing {
    #[serde(default, rename = "peggedAssets")]
    pub pegged_assets: Vec<PeggedAsset>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeggedAsset {
    #[serde(default)]
    pub circulating: Circulating,
}

#[derive(Debug, Default, Deserialize)]
pub struct Circulating {
    #[serde(default, rename = "peggedUSD")]
    pub pegged_usd: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Protocol {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tvl: Option<f64>,
}

/// Sum of circulating USD over every pegged asset.
pub fn total_stablecoin_supply(listing: &StablecoinListing) -> f64 {
    listing
        .pegged_assets
        .iter()
        .filter_map(|asset| asset.circulating.pegged_usd)
        .filter(|value| value.is_finite())
        .sum()
}

/// Sum of TVL over RWA protocols, with the number of contributing protocols.
pub fn total_rwa_tvl(protocols: &[Protocol]) -> (f64, usize) {
    protocols
        .iter()
        .filter(|protocol| {
            protocol
                .category
                .as_deref()
                .is_some_and(|category| RWA_CATEGORIES.contains(&category))
        })
        .filter_map(|protocol| protocol.tvl)
        .filter(|tvl| *tvl != 0.0 && tvl.is_finite())
        .fold((0.0, 0), |(total, count), tvl| (total + tvl, count + 1))
}

#[derive(Debug, Clone)]
pub struct StablecoinSupply {
    base_url: String,
}

impl StablecoinSupply {
    pub fn new(base_url: impl ToString) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl MetricSource for StablecoinSupply {
    fn name(&self) -> String {
        "DefiLlama API".to_string()
    }

    fn provider(&self) -> &'static str {
        "DefiLlama"
    }

    #[instrument(skip_all)]
    async fn fetch(&self, client: &Client) -> Result<Sample> {
        let url = format!("{}/stablecoins", self.base_url);
        let request = client.get(&url).query(&[("includePrices", "true")]);

        let listing: StablecoinListing = fetch_json(request)
            .await
            .context("DefiLlama stablecoins")?;

        let total = total_stablecoin_supply(&listing);
        if total == 0.0 {
            bail!("No stablecoin data found");
        }

        debug!("{} pegged assets, total {total}", listing.pegged_assets.len());
        Ok(Sample::new(total))
    }
}

#[derive(Debug, Clone)]
pub struct RwaTvl {
    base_url: String,
}

impl RwaTvl {
    pub fn new(base_url: impl ToString) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

#[async_trait]
impl MetricSource for RwaTvl {
    fn name(&self) -> String {
        "DefiLlama API".to_string()
    }

    fn provider(&self) -> &'static str {
        "DefiLlama"
    }

    #[instrument(skip_all)]
    async fn fetch(&self, client: &Client) -> Result<Sample> {
        let url = format!("{}/protocols", self.base_url);
        let protocols: Vec<Protocol> = fetch_json(client.get(&url))
            .await
            .context("DefiLlama protocols")?;

        let (total, count) = total_rwa_tvl(&protocols);
        if total == 0.0 {
            bail!("No RWA protocols found or total TVL is zero");
        }

        debug!("{count} RWA protocols, total {total}");
        Ok(Sample::new(total).with_provenance(format!("DefiLlama API ({count} protocols)")))
    }
}
