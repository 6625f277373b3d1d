//! Descriptive statistics over a test's samples.
//!
//! Results are display-ready: every number except the anomaly indices is a fixed
//! two-decimal string.

use crate::constants::ANOMALY_SIGMA;
use serde::Serialize;

/// Summary of one series.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResult {
    pub mean: String,
    /// Element at `n / 2` of the sorted series (upper-middle for even lengths).
    pub median: String,
    pub min: String,
    pub max: String,
    /// Population standard deviation.
    pub std_dev: String,
    /// Mean first difference; `NaN` for fewer than two samples.
    pub avg_rate_of_change: String,
    /// Indices further than two standard deviations from the mean.
    pub anomalies: Vec<usize>,
}

impl StatsResult {
    /// The rounded mean as a number, as drawn by the mean line.
    pub fn mean_value(&self) -> f64 {
        self.mean.parse().unwrap_or(f64::NAN)
    }
}

/// Compute statistics, or `None` when there are no samples.
///
/// `None` means "no statistics available"; callers must not read it as zeros.
pub fn compute_stats(points: &[f64]) -> Option<StatsResult> {
    if points.is_empty() {
        return None;
    }

    let n = points.len() as f64;
    let mean = points.iter().sum::<f64>() / n;

    let mut sorted = points.to_vec();
    sorted.sort_by(f64::total_cmp);
    let median = sorted[points.len() / 2];

    let min = points.iter().copied().fold(f64::INFINITY, f64::min);
    let max = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let variance = points.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let avg_rate_of_change = if points.len() < 2 {
        f64::NAN
    } else {
        points.windows(2).map(|w| w[1] - w[0]).sum::<f64>() / (n - 1.0)
    };

    let anomalies = points
        .iter()
        .enumerate()
        .filter(|(_, value)| (*value - mean).abs() > ANOMALY_SIGMA * std_dev)
        .map(|(index, _)| index)
        .collect();

    Some(StatsResult {
        mean: to_fixed(mean, 2),
        median: to_fixed(median, 2),
        min: to_fixed(min, 2),
        max: to_fixed(max, 2),
        std_dev: to_fixed(std_dev, 2),
        avg_rate_of_change: to_fixed(avg_rate_of_change, 2),
        anomalies,
    })
}

/// Tooltip text for the change into sample `index` from its predecessor.
///
/// Returns `None` for the first sample or an out-of-range index.
pub fn point_change(points: &[f64], index: usize) -> Option<String> {
    if index == 0 || index >= points.len() {
        return None;
    }
    let previous = points[index - 1];
    let change = points[index] - previous;
    let percent = change / previous * 100.0;
    Some(format!(
        "Change: {} ({}%)",
        to_fixed(change, 2),
        to_fixed(percent, 1)
    ))
}

/// Fixed-decimal rendering with `NaN`/`Infinity` spelled out and no negative zero.
pub fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".into();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.into();
    }
    if value == 0.0 {
        return format!("{:.*}", digits, 0.0);
    }
    format!("{value:.digits$}")
}
