//! Weighted statistics used for colour bars and hover text.

use anyhow::{Result, bail};

/// Weighted quantile of `values`.
///
/// Pairs where either the value or the weight is missing (or NaN) are
/// dropped. The remaining pairs are sorted by value, and the result is the
/// smallest value whose cumulative weight reaches `quantile * total`.
///
/// # Errors
///
/// Fails when the slices differ in length, `quantile` is outside `[0, 1]`,
/// a weight is negative, or the total weight is zero (which includes having
/// no usable pairs at all).
pub fn weighted_quantile(
    values: &[Option<f64>],
    weights: &[Option<f64>],
    quantile: f64,
) -> Result<f64> {
    if values.len() != weights.len() {
        bail!(
            "weighted quantile needs equal lengths, got {} values and {} weights",
            values.len(),
            weights.len()
        );
    }
    if !(0.0..=1.0).contains(&quantile) {
        bail!("quantile {quantile} is outside [0, 1]");
    }

    let mut pairs: Vec<(f64, f64)> = values
        .iter()
        .zip(weights)
        .filter_map(|pair| match pair {
            (Some(v), Some(w)) if !v.is_nan() && !w.is_nan() => Some((*v, *w)),
            _ => None,
        })
        .collect();

    if let Some((_, w)) = pairs.iter().find(|(_, w)| *w < 0.0) {
        bail!("weighted quantile got negative weight {w}");
    }

    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut running = 0.0;
    let cumulative: Vec<f64> = pairs
        .iter()
        .map(|(_, w)| {
            running += w;
            running
        })
        .collect();

    let total = cumulative.last().copied().unwrap_or(0.0);
    if total <= 0.0 {
        bail!("total weight is zero, weighted quantile is undefined");
    }

    let cutoff = total * quantile;
    let idx = cumulative.partition_point(|c| *c < cutoff);
    Ok(pairs[idx.min(pairs.len() - 1)].0)
}

pub fn weighted_median(values: &[Option<f64>], weights: &[Option<f64>]) -> Result<f64> {
    weighted_quantile(values, weights, 0.5)
}

/// Share of `values` at or below `observation`, as a truncated percentage.
///
/// 100 is reported as 99. `None` for an empty slice.
pub fn percentile_rank(values: &[f64], observation: f64) -> Option<u32> {
    if values.is_empty() {
        return None;
    }
    let at_or_below = values.iter().filter(|v| **v <= observation).count();
    let pct = (at_or_below as f64 / values.len() as f64 * 100.0) as u32;
    Some(pct.min(99))
}

/// Appends an ordinal suffix chosen by the last digit alone, so 11, 12 and
/// 13 read "11st", "12nd", "13rd".
pub fn ordinal(n: u32) -> String {
    let suffix = match n % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

/// Percentile rank of `observation` within `values`, e.g. `"42nd"`.
pub fn format_percentile(values: &[f64], observation: f64) -> String {
    percentile_rank(values, observation)
        .map(ordinal)
        .unwrap_or_else(|| crate::format::NA.to_string())
}

/// Natural-log transform rescaled onto `[0, 100]`.
///
/// Used to spread right-skewed amounts across a colour scale shared with
/// percentage frames. [`LogScale::invert`] maps a position back to an amount
/// for tick labels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogScale {
    min: f64,
    span: f64,
}

impl LogScale {
    /// Fits the scale to the smallest and largest of `values`, which must
    /// all be positive.
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.is_empty() {
            bail!("cannot fit a log scale to no values");
        }
        if let Some(v) = values.iter().find(|v| **v <= 0.0 || !v.is_finite()) {
            bail!("log scale needs positive finite values, got {v}");
        }
        let logs = values.iter().map(|v| v.ln());
        let min = logs.clone().fold(f64::INFINITY, f64::min);
        let max = logs.fold(f64::NEG_INFINITY, f64::max);
        Ok(Self {
            min,
            span: max - min,
        })
    }

    /// Position of `value` on the 0–100 scale. Every value maps to 50 when
    /// the fitted values were all equal.
    pub fn normalize(&self, value: f64) -> f64 {
        if self.span == 0.0 {
            return 50.0;
        }
        100.0 * (value.ln() - self.min) / self.span
    }

    pub fn invert(&self, position: f64) -> f64 {
        (position / 100.0 * self.span + self.min).exp()
    }
}
