use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// ECG analysis request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({"voltages": [0.12, 0.48, -0.05, 1.02], "heartRate": 72}))]
pub struct EcgAnalysisRequest {
    /// Raw voltage samples, in order. Must not be empty.
    pub voltages: Vec<f64>,
    /// Heart rate measured alongside the trace
    #[serde(rename = "heartRate")]
    pub heart_rate: Option<f64>,
}

/// Heart-rate analysis request. Zero or negative samples count as missing readings.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({"bpm_values": [72, 75, 0, 81, 69]}))]
pub struct HeartAnalysisRequest {
    pub bpm_values: Vec<f64>,
    /// Precomputed minimum; recomputed when absent or zero
    pub min: Option<f64>,
    /// Precomputed maximum; recomputed when absent or zero
    pub max: Option<f64>,
    /// Precomputed average; recomputed when absent or zero
    pub average: Option<f64>,
}

/// One glucose reading. Clients name fields differently; the first present alias wins.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GlucoseReading {
    /// Reading in mg/dL (preferred name)
    #[serde(rename = "glucoseValue")]
    pub glucose_value: Option<f64>,
    /// Reading in mg/dL
    pub blood_glucose: Option<f64>,
    /// Reading in mg/dL
    pub value: Option<f64>,
    /// When the reading was taken (preferred name)
    pub timestamp: Option<String>,
    /// When the reading was taken
    pub recorded_at: Option<String>,
    /// When the reading was taken
    #[serde(rename = "dateTime")]
    pub date_time: Option<String>,
}

/// Glucose analysis request.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({"glucose_data": [
    {"glucoseValue": 95, "timestamp": "2024-05-01T08:00:00Z"},
    {"blood_glucose": 162, "recorded_at": "2024-05-01T13:00:00Z"}
]}))]
pub struct GlucoseAnalysisRequest {
    pub glucose_data: Vec<GlucoseReading>,
}

/// HRV analysis request over RR intervals in milliseconds.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[schema(example = json!({"rr_intervals": [800, 810, 790, 805]}))]
pub struct HrvAnalysisRequest {
    pub rr_intervals: Vec<f64>,
    /// Precomputed SDNN in ms; computed from the intervals when absent
    pub sdnn: Option<f64>,
    /// Precomputed RMSSD in ms; computed from the intervals when absent
    pub rmssd: Option<f64>,
}

/// ECG interpretation, or a localized failure message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EcgAnalysisResponse {
    pub comment: String,
}

/// Heart-rate interpretation, or a localized failure message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HeartAnalysisResponse {
    pub heart_interpretation: String,
}

/// Glucose interpretation, or a localized failure message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GlucoseAnalysisResponse {
    pub interpretation: String,
}

/// HRV interpretation, or a localized failure message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HrvAnalysisResponse {
    pub hrv_interpretation: String,
}
