pub mod config;
pub mod delta;
pub mod format;
pub mod message;
pub mod notify;
pub mod report;
pub mod resolver;
pub mod snapshot;
pub mod sources;
pub mod storage;
pub mod tick;
pub mod util;

use std::fmt;

use serde::{Deserialize, Serialize};

/// The six tracked indicators. Closed set; every snapshot carries all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MetricId {
    #[serde(rename = "us_10y_yield")]
    Us10yYield,
    #[serde(rename = "bitcoin_price")]
    BitcoinPrice,
    #[serde(rename = "stablecoin_mcap")]
    StablecoinMcap,
    #[serde(rename = "rwa_tvl")]
    RwaTvl,
    #[serde(rename = "usdt_dominance")]
    UsdtDominance,
    #[serde(rename = "fed_net_liquidity")]
    FedNetLiquidity,
}

impl MetricId {
    /// All metrics, in resolution and report order.
    pub const ALL: [MetricId; 6] = [
        MetricId::Us10yYield,
        MetricId::BitcoinPrice,
        MetricId::StablecoinMcap,
        MetricId::RwaTvl,
        MetricId::UsdtDominance,
        MetricId::FedNetLiquidity,
    ];

    /// Key used in the persisted snapshot.
    pub fn key(self) -> &'static str {
        match self {
            MetricId::Us10yYield => "us_10y_yield",
            MetricId::BitcoinPrice => "bitcoin_price",
            MetricId::StablecoinMcap => "stablecoin_mcap",
            MetricId::RwaTvl => "rwa_tvl",
            MetricId::UsdtDominance => "usdt_dominance",
            MetricId::FedNetLiquidity => "fed_net_liquidity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MetricId::Us10yYield => "US 10Y Bond Yield",
            MetricId::BitcoinPrice => "Bitcoin Price",
            MetricId::StablecoinMcap => "Stablecoin Market Cap",
            MetricId::RwaTvl => "Total RWA TVL",
            MetricId::UsdtDominance => "USDT Dominance",
            MetricId::FedNetLiquidity => "Fed Net Liquidity",
        }
    }

    pub fn category(self) -> Category {
        match self {
            MetricId::Us10yYield | MetricId::FedNetLiquidity => Category::Macro,
            MetricId::BitcoinPrice | MetricId::StablecoinMcap => Category::Market,
            MetricId::UsdtDominance | MetricId::RwaTvl => Category::Alpha,
        }
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Message sections the metrics are grouped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Macro,
    Market,
    Alpha,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Macro, Category::Market, Category::Alpha];

    pub fn heading(self) -> &'static str {
        match self {
            Category::Macro => "🏛️ Macro",
            Category::Market => "📈 Market",
            Category::Alpha => "🎯 Alpha",
        }
    }

    /// Metrics of this category in display order.
    pub fn metrics(self) -> [MetricId; 2] {
        match self {
            Category::Macro => [MetricId::Us10yYield, MetricId::FedNetLiquidity],
            Category::Market => [MetricId::BitcoinPrice, MetricId::StablecoinMcap],
            Category::Alpha => [MetricId::UsdtDominance, MetricId::RwaTvl],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadingStatus {
    Ok,
    Failed(String),
}

/// Outcome of resolving one metric during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReading {
    pub id: MetricId,
    pub value: Option<f64>,
    /// 7-period trailing change in percent, where the source provides enough history.
    pub seven_day_change: Option<f64>,
    pub source: String,
    pub status: ReadingStatus,
}

impl MetricReading {
    pub fn success(
        id: MetricId,
        value: f64,
        seven_day_change: Option<f64>,
        source: impl ToString,
    ) -> Self {
        Self {
            id,
            value: Some(value),
            seven_day_change,
            source: source.to_string(),
            status: ReadingStatus::Ok,
        }
    }

    pub fn failed(id: MetricId, source: impl ToString, reason: impl ToString) -> Self {
        Self {
            id,
            value: None,
            seven_day_change: None,
            source: source.to_string(),
            status: ReadingStatus::Failed(reason.to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ReadingStatus::Ok
    }
}
