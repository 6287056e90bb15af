//! Human-readable result table printed after every tick

use crate::format::{UNAVAILABLE, format_report_value};
use crate::{MetricReading, ReadingStatus};

const HEADERS: [&str; 4] = ["Metric", "Value", "Source", "Status"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub metric: String,
    pub value: String,
    pub source: String,
    pub status: String,
}

impl From<&MetricReading> for ReportRow {
    fn from(reading: &MetricReading) -> Self {
        let value = reading
            .value
            .map(|value| format_report_value(reading.id, value))
            .unwrap_or_else(|| UNAVAILABLE.to_string());

        let status = match &reading.status {
            ReadingStatus::Ok => "✓ Success".to_string(),
            ReadingStatus::Failed(reason) => format!("✗ Failed: {reason}"),
        };

        Self {
            metric: reading.id.label().to_string(),
            value,
            source: reading.source.clone(),
            status,
        }
    }
}

impl ReportRow {
    fn cells(&self) -> [&str; 4] {
        [&self.metric, &self.value, &self.source, &self.status]
    }
}

/// Render readings as a boxed table.
pub fn render(readings: &[MetricReading]) -> String {
    let rows: Vec<ReportRow> = readings.iter().map(ReportRow::from).collect();

    let mut widths = HEADERS.map(|header| header.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule = |left: &str, mid: &str, right: &str| {
        let segments: Vec<String> = widths.iter().map(|width| "─".repeat(width + 2)).collect();
        format!("{left}{}{right}", segments.join(mid))
    };
    let line = |cells: [&str; 4]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let padding = width - cell.chars().count();
                format!(" {cell}{} ", " ".repeat(padding))
            })
            .collect();
        format!("│{}│", padded.join("│"))
    };

    let mut out = vec![rule("╭", "┬", "╮"), line(HEADERS), rule("├", "┼", "┤")];
    out.extend(rows.iter().map(|row| line(row.cells())));
    out.push(rule("╰", "┴", "╯"));
    out.join("\n")
}
