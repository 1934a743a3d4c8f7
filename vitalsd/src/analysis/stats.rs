//! Summary statistics over a biosignal series.

use serde::Serialize;

use super::SignalKind;
use crate::errors::{Error, Result};

/// Summary values supplied by the client. Present, non-zero values win over recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SummaryOverrides {
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub sdnn: Option<f64>,
    pub rmssd: Option<f64>,
}

/// Statistics for the valid subset of one request's series.
///
/// Values keep full precision; rounding happens only when the prompt is rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSummary {
    /// Number of valid samples
    pub count: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// Standard deviation of RR intervals (HRV only)
    pub sdnn: Option<f64>,
    /// Root mean square of successive RR differences (HRV only)
    pub rmssd: Option<f64>,
}

/// Samples that count as real readings for `kind`.
pub fn valid_subset(kind: SignalKind, values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite() && (!kind.filters_non_positive() || *v > 0.0))
        .collect()
}

/// Summarize `values` for `kind`, applying any client-supplied overrides.
///
/// Fails with [`Error::NoValidData`] if filtering leaves nothing.
pub fn summarize(kind: SignalKind, values: &[f64], overrides: &SummaryOverrides) -> Result<SignalSummary> {
    let valid = valid_subset(kind, values);
    if valid.is_empty() {
        return Err(Error::NoValidData { kind });
    }

    let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
    let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // Summation error can push the mean a hair outside the range
    let average = mean(&valid).clamp(min, max);

    let (sdnn, rmssd) = if kind == SignalKind::Hrv {
        (
            supplied(overrides.sdnn).or_else(|| sdnn(&valid)),
            supplied(overrides.rmssd).or_else(|| rmssd(&valid)),
        )
    } else {
        (None, None)
    };

    Ok(SignalSummary {
        count: valid.len(),
        average: supplied(overrides.average).unwrap_or(average),
        min: supplied(overrides.min).unwrap_or(min),
        max: supplied(overrides.max).unwrap_or(max),
        sdnn,
        rmssd,
    })
}

/// Population standard deviation. `None` for fewer than two samples.
pub fn sdnn(rr: &[f64]) -> Option<f64> {
    if rr.len() < 2 {
        return None;
    }
    let m = mean(rr);
    let variance = rr.iter().map(|v| (v - m).powi(2)).sum::<f64>() / rr.len() as f64;
    Some(variance.sqrt())
}

/// Root mean square of first differences. `None` for fewer than two samples.
pub fn rmssd(rr: &[f64]) -> Option<f64> {
    if rr.len() < 2 {
        return None;
    }
    let squares: Vec<f64> = rr.windows(2).map(|w| (w[1] - w[0]).powi(2)).collect();
    Some(mean(&squares).sqrt())
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

// Zero is the client's "not computed" value
fn supplied(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v != 0.0)
}
