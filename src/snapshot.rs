//! Snapshot - the single persisted record of one tick
//!
//! The JSON layout is shared with other consumers of the snapshot file, so
//! field names are fixed:
//!
//! ```text
//! {
//!   "timestamp": "2025-01-01T12:00:00Z",
//!   "timestamp_unix": 1735732800,
//!   "metrics": { "us_10y_yield": 4.2, "us_10y_yield_7d_change": 1.1, "bitcoin_price": null, ... },
//!   "summary": { "total_metrics": 6, "successful": 5, "failed": 1 }
//! }
//! ```
//!
//! All six metric keys are always written, `null` when unavailable. The 7-day
//! change companions are only written when known.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{MetricId, MetricReading};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub timestamp_unix: i64,
    pub metrics: MetricValues,
    pub summary: Summary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricValues {
    pub us_10y_yield: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub us_10y_yield_7d_change: Option<f64>,
    pub bitcoin_price: Option<f64>,
    pub stablecoin_mcap: Option<f64>,
    pub rwa_tvl: Option<f64>,
    pub usdt_dominance: Option<f64>,
    pub fed_net_liquidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fed_net_liquidity_7d_change: Option<f64>,
}

impl MetricValues {
    pub fn get(&self, id: MetricId) -> Option<f64> {
        match id {
            MetricId::Us10yYield => self.us_10y_yield,
            MetricId::BitcoinPrice => self.bitcoin_price,
            MetricId::StablecoinMcap => self.stablecoin_mcap,
            MetricId::RwaTvl => self.rwa_tvl,
            MetricId::UsdtDominance => self.usdt_dominance,
            MetricId::FedNetLiquidity => self.fed_net_liquidity,
        }
    }

    pub fn set(&mut self, id: MetricId, value: Option<f64>) {
        let slot = match id {
            MetricId::Us10yYield => &mut self.us_10y_yield,
            MetricId::BitcoinPrice => &mut self.bitcoin_price,
            MetricId::StablecoinMcap => &mut self.stablecoin_mcap,
            MetricId::RwaTvl => &mut self.rwa_tvl,
            MetricId::UsdtDominance => &mut self.usdt_dominance,
            MetricId::FedNetLiquidity => &mut self.fed_net_liquidity,
        };
        *slot = value;
    }

    /// 7-day change companion; only two metrics carry one.
    pub fn seven_day_change(&self, id: MetricId) -> Option<f64> {
        match id {
            MetricId::Us10yYield => self.us_10y_yield_7d_change,
            MetricId::FedNetLiquidity => self.fed_net_liquidity_7d_change,
            _ => None,
        }
    }

    fn set_seven_day_change(&mut self, id: MetricId, change: Option<f64>) {
        match id {
            MetricId::Us10yYield => self.us_10y_yield_7d_change = change,
            MetricId::FedNetLiquidity => self.fed_net_liquidity_7d_change = change,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_metrics: usize,
    pub successful: usize,
    pub failed: usize,
}

impl Snapshot {
    /// Build the snapshot for a tick. Metrics without a successful reading
    /// are stored as absent and counted as failed.
    pub fn from_readings(readings: &[MetricReading], timestamp: DateTime<Utc>) -> Self {
        let mut metrics = MetricValues::default();
        let mut successful = 0;

        for id in MetricId::ALL {
            let Some(reading) = readings.iter().find(|r| r.id == id && r.is_ok()) else {
                continue;
            };

            metrics.set(id, reading.value);
            metrics.set_seven_day_change(id, reading.seven_day_change);
            successful += 1;
        }

        let total_metrics = MetricId::ALL.len();

        Self {
            timestamp,
            timestamp_unix: timestamp.timestamp(),
            metrics,
            summary: Summary {
                total_metrics,
                successful,
                failed: total_metrics - successful,
            },
        }
    }

    pub fn value(&self, id: MetricId) -> Option<f64> {
        self.metrics.get(id)
    }
}

/// Accepts RFC 3339 as well as the offset-less ISO-8601 form written by
/// earlier versions, which is read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}
