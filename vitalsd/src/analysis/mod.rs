//! Biosignal analysis pipeline.
//!
//! A request moves through the stages in a fixed order:
//!
//! 1. [`validate`] checks the JSON body for the signal kind and builds an [`AnalysisRequest`]
//! 2. [`normalize`] resolves aliased glucose fields into [`normalize::GlucoseEntry`] values
//! 3. [`stats`] filters invalid readings and computes a [`stats::SignalSummary`]
//! 4. [`prompt`] renders the kind's instruction template
//! 5. the configured [`crate::providers::Provider`] generates a reply, which
//!    [`crate::providers::response`] reduces to one trimmed string
//!
//! [`pipeline::analyze`] drives the stages. Nothing here keeps state between requests.

pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod stats;
pub mod validate;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Locale;
use normalize::GlucoseEntry;
use stats::SummaryOverrides;

/// The kind of biosignal a request carries.
///
/// Selects validation, filtering, prompt template, truncation bound, generation parameters and the
/// response key. No other branching depends on the request contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Ecg,
    HeartRate,
    Glucose,
    Hrv,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [SignalKind::Ecg, SignalKind::HeartRate, SignalKind::Glucose, SignalKind::Hrv];

    pub fn as_str(self) -> &'static str {
        match self {
            SignalKind::Ecg => "ecg",
            SignalKind::HeartRate => "heart_rate",
            SignalKind::Glucose => "glucose",
            SignalKind::Hrv => "hrv",
        }
    }

    /// JSON key carrying the interpretation (or fallback message) in the response body.
    pub fn response_key(self) -> &'static str {
        match self {
            SignalKind::Ecg => "comment",
            SignalKind::HeartRate => "heart_interpretation",
            SignalKind::Glucose => "interpretation",
            SignalKind::Hrv => "hrv_interpretation",
        }
    }

    /// Request field holding the required series.
    pub fn series_field(self) -> &'static str {
        match self {
            SignalKind::Ecg => "voltages",
            SignalKind::HeartRate => "bpm_values",
            SignalKind::Glucose => "glucose_data",
            SignalKind::Hrv => "rr_intervals",
        }
    }

    /// How many raw samples the prompt shows before the "series continues" marker.
    pub fn prompt_series_limit(self) -> usize {
        match self {
            SignalKind::Ecg => 20,
            SignalKind::HeartRate => 50,
            SignalKind::Glucose => 10,
            SignalKind::Hrv => 50,
        }
    }

    pub fn generation_params(self) -> GenerationParams {
        match self {
            SignalKind::Ecg => GenerationParams {
                max_tokens: 512,
                temperature: 0.5,
            },
            // Four-section answer needs the wider budget
            SignalKind::HeartRate => GenerationParams {
                max_tokens: 1024,
                temperature: 0.5,
            },
            SignalKind::Glucose | SignalKind::Hrv => GenerationParams {
                max_tokens: 512,
                temperature: 0.7,
            },
        }
    }

    /// Whether non-positive samples are dropped as missing readings.
    ///
    /// Heart rate, glucose and RR intervals use 0 as a "no reading" sentinel. ECG voltages are
    /// signed, so only non-finite samples are dropped for them.
    pub fn filters_non_positive(self) -> bool {
        !matches!(self, SignalKind::Ecg)
    }

    /// Human name of the signal, used in validation messages.
    pub fn signal_label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (SignalKind::Ecg, Locale::Tr) => "EKG voltaj",
            (SignalKind::Ecg, Locale::En) => "ECG voltage",
            (SignalKind::HeartRate, Locale::Tr) => "Nabız (BPM)",
            (SignalKind::HeartRate, Locale::En) => "Heart rate (BPM)",
            (SignalKind::Glucose, Locale::Tr) => "Glukoz",
            (SignalKind::Glucose, Locale::En) => "Glucose",
            (SignalKind::Hrv, Locale::Tr) => "RR aralığı",
            (SignalKind::Hrv, Locale::En) => "RR interval",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sampling controls sent with each provider call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f64,
}

/// A validated analysis request, one variant per signal kind.
///
/// Series are guaranteed non-empty. Optional fields are client-supplied summary values.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Ecg {
        voltages: Vec<f64>,
        heart_rate: Option<f64>,
    },
    HeartRate {
        bpm_values: Vec<f64>,
        min: Option<f64>,
        max: Option<f64>,
        average: Option<f64>,
    },
    Glucose {
        entries: Vec<GlucoseEntry>,
    },
    Hrv {
        rr_intervals: Vec<f64>,
        sdnn: Option<f64>,
        rmssd: Option<f64>,
    },
}

impl AnalysisRequest {
    pub fn kind(&self) -> SignalKind {
        match self {
            AnalysisRequest::Ecg { .. } => SignalKind::Ecg,
            AnalysisRequest::HeartRate { .. } => SignalKind::HeartRate,
            AnalysisRequest::Glucose { .. } => SignalKind::Glucose,
            AnalysisRequest::Hrv { .. } => SignalKind::Hrv,
        }
    }

    /// The numeric series statistics are computed over, in input order.
    pub fn series(&self) -> Vec<f64> {
        match self {
            AnalysisRequest::Ecg { voltages, .. } => voltages.clone(),
            AnalysisRequest::HeartRate { bpm_values, .. } => bpm_values.clone(),
            AnalysisRequest::Glucose { entries } => entries.iter().map(|entry| entry.value).collect(),
            AnalysisRequest::Hrv { rr_intervals, .. } => rr_intervals.clone(),
        }
    }

    /// Client-supplied summary values that take precedence over recomputation.
    pub fn overrides(&self) -> SummaryOverrides {
        match self {
            AnalysisRequest::HeartRate { min, max, average, .. } => SummaryOverrides {
                min: *min,
                max: *max,
                average: *average,
                ..Default::default()
            },
            AnalysisRequest::Hrv { sdnn, rmssd, .. } => SummaryOverrides {
                sdnn: *sdnn,
                rmssd: *rmssd,
                ..Default::default()
            },
            AnalysisRequest::Ecg { .. } | AnalysisRequest::Glucose { .. } => SummaryOverrides::default(),
        }
    }
}

/// Outcome of a successful analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    pub kind: SignalKind,
    pub interpretation: String,
}
