//! Notification text assembly
//!
//! The banner carries the timestamp and, when the yield or USDT dominance is
//! known, the risk regime. Metrics are grouped into fixed categories. A metric line is only included
//! when its value is not marked neutral, and a category heading only when it
//! has at least one line. With no qualifying lines the message is just the
//! banner, which callers treat as "nothing actionable".

use crate::delta::Evaluation;
use crate::format::Indicator;
use crate::snapshot::Snapshot;
use crate::{Category, MetricId};

pub const BANNER: &str = "📊 Macro & Web3 Pulse";

/// Yield above this (in percent) means risk off.
const YIELD_RISK_OFF: f64 = 4.5;
/// USDT dominance above this (in percent) means risk off.
const DOMINANCE_RISK_OFF: f64 = 6.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    RiskOn,
    RiskOff,
}

impl Regime {
    /// `None` when neither the yield nor the dominance is available.
    pub fn from_snapshot(snapshot: &Snapshot) -> Option<Regime> {
        let known = |id| snapshot.value(id).filter(|value: &f64| value.is_finite());
        let yield_pct = known(MetricId::Us10yYield);
        let dominance = known(MetricId::UsdtDominance);

        if yield_pct.is_none() && dominance.is_none() {
            return None;
        }

        let bearish = yield_pct.is_some_and(|value| value > YIELD_RISK_OFF)
            || dominance.is_some_and(|value| value > DOMINANCE_RISK_OFF);
        Some(if bearish { Regime::RiskOff } else { Regime::RiskOn })
    }

    pub fn label(self) -> &'static str {
        match self {
            Regime::RiskOn => "🟢 RISK ON",
            Regime::RiskOff => "🔴 RISK OFF",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub text: String,

    /// Number of metric lines below the banner
    pub lines: usize,
}

impl ComposedMessage {
    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }
}

/// Build the message for `snapshot`, the snapshot `evaluation` was computed for.
pub fn compose(evaluation: &Evaluation, snapshot: &Snapshot) -> ComposedMessage {
    let mut text = format!("{BANNER}\n{}", snapshot.timestamp.format("%Y-%m-%d %H:%M UTC"));
    if let Some(regime) = Regime::from_snapshot(snapshot) {
        text.push_str("\nRegime: ");
        text.push_str(regime.label());
    }
    let mut lines = 0;

    for category in Category::ALL {
        let section: Vec<String> = category
            .metrics()
            .into_iter()
            .filter_map(|id| evaluation.get(id))
            .filter(|result| result.indicator() != Some(Indicator::Neutral))
            .map(|result| format!("• {}: {}", result.id.label(), result.presentation()))
            .collect();

        if section.is_empty() {
            continue;
        }

        lines += section.len();
        text.push_str("\n\n");
        text.push_str(category.heading());
        for line in section {
            text.push('\n');
            text.push_str(&line);
        }
    }

    ComposedMessage { text, lines }
}
