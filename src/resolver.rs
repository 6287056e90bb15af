//! MetricResolver - turns provider queries into one reading per metric
//!
//! Every metric is described declaratively by a `MetricDescriptor`: the id and
//! an ordered chain of sources. One generic driver evaluates all descriptors
//! with the same policy:
//!
//! ```text
//! attempt 1: source[0] → source[1] → … ─┐ first usable value wins
//!            all failed → sleep backoff │
//! attempt 2: source[0] → source[1] → … ─┤
//!            all failed → Failed(reason)┘
//! ```
//!
//! Metrics are resolved concurrently. Each resolution owns its own retry loop,
//! so one metric sleeping in backoff never holds up another, and results are
//! only combined once every metric has finished.

use std::time::Duration;

use anyhow::Context;
use futures::future::join_all;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::sources::coingecko::{CoinGeckoPrice, UsdtDominance};
use crate::sources::defillama::{RwaTvl, StablecoinSupply};
use crate::sources::fred::{self, FredClient, FredNetLiquidity, FredSeries};
use crate::sources::MetricSource;
use crate::sources::yahoo::{self, YahooChart};
use crate::util::truncate;
use crate::{MetricId, MetricReading};

/// Failure reasons are cut to this many characters for the report.
pub const MAX_REASON_LEN: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Passes over the whole source chain
    pub max_attempts: u32,

    /// Fixed pause between passes
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(2),
        }
    }
}

impl From<&crate::config::RetryConfig> for RetryPolicy {
    fn from(config: &crate::config::RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            backoff: Duration::from_secs(config.backoff_secs),
        }
    }
}

/// How to obtain one metric: sources are tried in order.
pub struct MetricDescriptor {
    pub id: MetricId,
    pub sources: Vec<Box<dyn MetricSource>>,
}

impl MetricDescriptor {
    pub fn new(id: MetricId) -> Self {
        Self {
            id,
            sources: Vec::new(),
        }
    }

    pub fn source(mut self, source: impl MetricSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Provider names joined for the failure row, e.g. "FRED/yfinance".
    fn providers(&self) -> String {
        let mut providers: Vec<&str> = Vec::new();
        for source in &self.sources {
            let provider = source.provider();
            if !providers.contains(&provider) {
                providers.push(provider);
            }
        }
        providers.join("/")
    }

    /// The production source chains for all six metrics.
    pub fn defaults(config: &Config) -> Vec<MetricDescriptor> {
        let endpoints = &config.endpoints;
        let fred_client =
            FredClient::new(&endpoints.fred, config.fred_api_key().map(String::from));

        vec![
            MetricDescriptor::new(MetricId::Us10yYield)
                .source(FredSeries::new(fred_client.clone(), fred::DGS10))
                .source(YahooChart::new(&endpoints.yahoo, yahoo::TNX)),
            MetricDescriptor::new(MetricId::BitcoinPrice)
                .source(CoinGeckoPrice::new(&endpoints.coingecko, "bitcoin"))
                .source(YahooChart::new(&endpoints.yahoo, yahoo::BTC_USD)),
            MetricDescriptor::new(MetricId::StablecoinMcap)
                .source(StablecoinSupply::new(&endpoints.llama_stablecoins)),
            MetricDescriptor::new(MetricId::RwaTvl)
                .source(RwaTvl::new(&endpoints.llama_protocols)),
            MetricDescriptor::new(MetricId::UsdtDominance)
                .source(UsdtDominance::new(&endpoints.coingecko)),
            MetricDescriptor::new(MetricId::FedNetLiquidity)
                .source(FredNetLiquidity::new(fred_client)),
        ]
    }
}

pub struct MetricResolver {
    client: Client,
    retry: RetryPolicy,
    deadline: Option<Duration>,
    descriptors: Vec<MetricDescriptor>,
}

impl MetricResolver {
    pub fn new(client: Client, retry: RetryPolicy, descriptors: Vec<MetricDescriptor>) -> Self {
        Self {
            client,
            retry,
            deadline: None,
            descriptors,
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("failed to build HTTP client")?;

        let resolver = Self::new(client, (&config.retry).into(), MetricDescriptor::defaults(config));
        Ok(match config.deadline() {
            Some(deadline) => resolver.with_deadline(deadline),
            None => resolver,
        })
    }

    /// Bound the time spent on a single metric, retries included. A zero
    /// duration means no bound.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = (!deadline.is_zero()).then_some(deadline);
        self
    }

    /// Resolve one metric. Never fails; problems end up in the reading's status.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: MetricId) -> MetricReading {
        let Some(descriptor) = self.descriptors.iter().find(|d| d.id == id) else {
            warn!("no sources configured");
            return MetricReading::failed(id, "none", "no sources configured");
        };

        let reading = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run_chain(descriptor))
                .await
                .unwrap_or_else(|_| {
                    MetricReading::failed(id, descriptor.providers(), "deadline exceeded")
                }),
            None => self.run_chain(descriptor).await,
        };

        match &reading.status {
            crate::ReadingStatus::Ok => info!("{id} resolved via {}", reading.source),
            crate::ReadingStatus::Failed(reason) => warn!("{id} unavailable: {reason}"),
        }

        reading
    }

    /// Resolve every tracked metric concurrently, in `MetricId::ALL` order.
    pub async fn resolve_all(&self) -> Vec<MetricReading> {
        join_all(MetricId::ALL.into_iter().map(|id| self.resolve(id))).await
    }

    async fn run_chain(&self, descriptor: &MetricDescriptor) -> MetricReading {
        let id = descriptor.id;
        let mut last_error: Option<anyhow::Error> = None;

        for attempt in 1..=self.retry.max_attempts {
            for source in &descriptor.sources {
                match source.fetch(&self.client).await {
                    Ok(sample) => {
                        let provenance = sample.provenance.unwrap_or_else(|| source.name());
                        return MetricReading::success(
                            id,
                            sample.value,
                            sample.seven_day_change,
                            provenance,
                        );
                    }
                    Err(e) => {
                        debug!("{id}: {} failed on attempt {attempt}: {e:#}", source.name());
                        last_error = Some(e);
                    }
                }
            }

            if attempt < self.retry.max_attempts {
                debug!("{id}: all sources failed, retrying in {:?}", self.retry.backoff);
                tokio::time::sleep(self.retry.backoff).await;
            }
        }

        let reason = last_error
            .map(|e| format!("{e:#}"))
            .unwrap_or_else(|| "no sources configured".to_string());

        MetricReading::failed(id, descriptor.providers(), truncate(&reason, MAX_REASON_LEN))
    }
}
