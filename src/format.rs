//! Fixed per-metric rendering
//!
//! Two renderings exist: the compact one used in notifications and the full
//! precision one used in the local report. Precision differs per metric and
//! consumers compare these strings, so they are not configurable.

use crate::MetricId;

/// Shown in place of a value that could not be fetched this tick.
pub const UNAVAILABLE: &str = "N/A";

/// Direction marker attached to a value that has a computed delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Up,
    Down,
    /// Change below the metric's threshold, including no change at all
    Neutral,
}

impl Indicator {
    pub fn emoji(self) -> &'static str {
        match self {
            Indicator::Up => "🟢",
            Indicator::Down => "🔴",
            Indicator::Neutral => "⚪",
        }
    }
}

/// Compact rendering used in notifications.
pub fn format_value(id: MetricId, value: f64) -> String {
    match id {
        MetricId::Us10yYield | MetricId::UsdtDominance => format!("{value:.2}%"),
        MetricId::BitcoinPrice => format!("${}", with_thousands(value, 0)),
        MetricId::FedNetLiquidity => format!("${value:.1}B"),
        MetricId::StablecoinMcap | MetricId::RwaTvl => format!("${:.2}B", value / 1e9),
    }
}

/// Full precision rendering used in the report table.
pub fn format_report_value(id: MetricId, value: f64) -> String {
    match id {
        MetricId::Us10yYield | MetricId::UsdtDominance => format!("{value:.2}%"),
        MetricId::BitcoinPrice => format!("${}", with_thousands(value, 2)),
        MetricId::FedNetLiquidity => format!("${}B", with_thousands(value, 0)),
        MetricId::StablecoinMcap | MetricId::RwaTvl => format!("${}", with_thousands(value, 0)),
    }
}

/// `" (🟢 +0.60%)"` for a fractional delta of 0.006.
pub fn delta_suffix(indicator: Indicator, delta: f64) -> String {
    format!(" ({} {:+.2}%)", indicator.emoji(), delta * 100.0)
}

/// Fixed-point rendering with `,` grouping of the integer part.
pub fn with_thousands(value: f64, decimals: usize) -> String {
    let plain = format!("{:.*}", decimals, value.abs());
    let (integer, fraction) = match plain.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (plain.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let is_zero = plain.chars().all(|c| c == '0' || c == '.');
    let sign = if value.is_sign_negative() && !is_zero { "-" } else { "" };

    match fraction {
        Some(fraction) => format!("{sign}{grouped}.{fraction}"),
        None => format!("{sign}{grouped}"),
    }
}
