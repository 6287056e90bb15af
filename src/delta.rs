//! DeltaEngine - decides whether a tick is worth a notification
//!
//! ```text
//! no prior snapshot          → notify, plain values
//! new value absent           → "N/A", never triggers
//! prior absent / zero / NaN  → plain value, no delta
//! otherwise                  → delta = (new - prior) / |prior|
//!                              triggered = delta != 0 && |delta| >= threshold
//! ```
//!
//! A single triggered metric is enough to notify.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use crate::MetricId;
use crate::format::{Indicator, UNAVAILABLE, delta_suffix, format_value};
use crate::snapshot::Snapshot;

/// Minimum fractional change per metric before it counts as a change.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    thresholds: BTreeMap<MetricId, f64>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            thresholds: BTreeMap::from([
                (MetricId::Us10yYield, 0.0),
                (MetricId::BitcoinPrice, 0.005),
                (MetricId::StablecoinMcap, 0.001),
                (MetricId::RwaTvl, 0.01),
                (MetricId::UsdtDominance, 0.005),
                (MetricId::FedNetLiquidity, 0.0),
            ]),
        }
    }
}

impl ThresholdTable {
    /// Default table with per-metric overrides applied. Negative or
    /// non-finite overrides are ignored.
    pub fn with_overrides(overrides: &HashMap<MetricId, f64>) -> Self {
        let mut table = Self::default();
        for (id, threshold) in overrides {
            if threshold.is_finite() && *threshold >= 0.0 {
                table.thresholds.insert(*id, *threshold);
            }
        }
        table
    }

    pub fn get(&self, id: MetricId) -> f64 {
        self.thresholds.get(&id).copied().unwrap_or(0.0)
    }
}

/// Comparison outcome for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaResult {
    pub id: MetricId,
    pub formatted_value: String,

    /// Fractional change against the prior snapshot, when computable
    pub delta_pct: Option<f64>,

    pub triggered: bool,
}

impl DeltaResult {
    fn unavailable(id: MetricId) -> Self {
        Self {
            id,
            formatted_value: UNAVAILABLE.to_string(),
            delta_pct: None,
            triggered: false,
        }
    }

    fn plain(id: MetricId, value: f64) -> Self {
        Self {
            id,
            formatted_value: format_value(id, value),
            delta_pct: None,
            triggered: false,
        }
    }

    /// Direction marker, only present when a delta was computed.
    pub fn indicator(&self) -> Option<Indicator> {
        let delta = self.delta_pct?;
        Some(match (self.triggered, delta > 0.0) {
            (false, _) => Indicator::Neutral,
            (true, true) => Indicator::Up,
            (true, false) => Indicator::Down,
        })
    }

    /// The value as shown in a message, e.g. `$50,300 (🟢 +0.60%)`.
    pub fn presentation(&self) -> String {
        match (self.indicator(), self.delta_pct) {
            (Some(indicator), Some(delta)) => {
                format!("{}{}", self.formatted_value, delta_suffix(indicator, delta))
            }
            _ => self.formatted_value.clone(),
        }
    }
}

/// Result of comparing a new snapshot to the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub should_notify: bool,
    pub first_run: bool,

    /// One entry per metric, in `MetricId::ALL` order
    pub results: Vec<DeltaResult>,
}

impl Evaluation {
    pub fn get(&self, id: MetricId) -> Option<&DeltaResult> {
        self.results.iter().find(|result| result.id == id)
    }

    pub fn presentation(&self) -> BTreeMap<MetricId, String> {
        self.results
            .iter()
            .map(|result| (result.id, result.presentation()))
            .collect()
    }

    pub fn triggered(&self) -> impl Iterator<Item = MetricId> + '_ {
        self.results
            .iter()
            .filter(|result| result.triggered)
            .map(|result| result.id)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeltaEngine {
    thresholds: ThresholdTable,
}

impl DeltaEngine {
    pub fn new(thresholds: ThresholdTable) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub fn evaluate(&self, new: &Snapshot, prior: Option<&Snapshot>) -> Evaluation {
        let results: Vec<DeltaResult> = MetricId::ALL
            .into_iter()
            .map(|id| self.compare(id, new, prior))
            .collect();

        let first_run = prior.is_none();
        let should_notify = first_run || results.iter().any(|result| result.triggered);

        debug!(
            "evaluated snapshot: first_run={first_run}, triggered={}, notify={should_notify}",
            results.iter().filter(|result| result.triggered).count()
        );

        Evaluation {
            should_notify,
            first_run,
            results,
        }
    }

    fn compare(&self, id: MetricId, new: &Snapshot, prior: Option<&Snapshot>) -> DeltaResult {
        let Some(value) = new.value(id).filter(|value| value.is_finite()) else {
            return DeltaResult::unavailable(id);
        };

        let previous = prior
            .and_then(|prior| prior.value(id))
            .filter(|previous| previous.is_finite() && *previous != 0.0);
        let Some(previous) = previous else {
            return DeltaResult::plain(id, value);
        };

        let delta = (value - previous) / previous.abs();
        let threshold = self.thresholds.get(id);
        let triggered = delta != 0.0 && delta.abs() >= threshold;

        trace!("{id}: {previous} -> {value} ({delta:+.6}, threshold {threshold}) triggered={triggered}");

        DeltaResult {
            id,
            formatted_value: format_value(id, value),
            delta_pct: Some(delta),
            triggered,
        }
    }
}
