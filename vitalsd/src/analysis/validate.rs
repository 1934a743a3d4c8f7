//! Request body validation.
//!
//! Runs before anything else touches the request, so a malformed body never costs a provider call.

use serde_json::{Map, Value};

use super::normalize;
use super::{AnalysisRequest, SignalKind};
use crate::errors::{Error, Result};

/// Check `body` against the shape required for `kind` and build the typed request.
///
/// The required series must be a non-empty array: of numbers for ECG, heart-rate and HRV, of
/// objects for glucose. Optional summary fields must be numbers (or null) when present.
pub fn validate(kind: SignalKind, body: &Value) -> Result<AnalysisRequest> {
    let body = body
        .as_object()
        .ok_or_else(|| Error::validation("body", "expected a JSON object"))?;
    let series = kind.series_field();

    let request = match kind {
        SignalKind::Ecg => AnalysisRequest::Ecg {
            voltages: number_series(body, series)?,
            heart_rate: optional_number(body, "heartRate")?,
        },
        SignalKind::HeartRate => AnalysisRequest::HeartRate {
            bpm_values: number_series(body, series)?,
            min: optional_number(body, "min")?,
            max: optional_number(body, "max")?,
            average: optional_number(body, "average")?,
        },
        SignalKind::Glucose => AnalysisRequest::Glucose {
            entries: normalize::glucose_entries(&object_series(body, series)?),
        },
        SignalKind::Hrv => AnalysisRequest::Hrv {
            rr_intervals: number_series(body, series)?,
            sdnn: optional_number(body, "sdnn")?,
            rmssd: optional_number(body, "rmssd")?,
        },
    };

    Ok(request)
}

fn required_array<'a>(body: &'a Map<String, Value>, field: &str) -> Result<&'a Vec<Value>> {
    let items = match body.get(field) {
        None | Some(Value::Null) => return Err(Error::validation(field, "missing")),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(Error::validation(field, "expected an array")),
    };

    if items.is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }

    Ok(items)
}

fn number_series(body: &Map<String, Value>, field: &str) -> Result<Vec<f64>> {
    required_array(body, field)?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_f64()
                .ok_or_else(|| Error::validation(field, format!("element {i} is not a number")))
        })
        .collect()
}

fn object_series<'a>(body: &'a Map<String, Value>, field: &str) -> Result<Vec<&'a Map<String, Value>>> {
    required_array(body, field)?
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_object()
                .ok_or_else(|| Error::validation(field, format!("element {i} is not an object")))
        })
        .collect()
}

fn optional_number(body: &Map<String, Value>, field: &str) -> Result<Option<f64>> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| Error::validation(field, "expected a number")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rejection(result: Result<AnalysisRequest>) -> (String, String) {
        match result {
            Err(Error::Validation { field, reason }) => (field, reason),
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_ecg_request() {
        let request = validate(SignalKind::Ecg, &json!({"voltages": [0.1, -0.2, 0.9], "heartRate": 72})).unwrap();
        assert_eq!(
            request,
            AnalysisRequest::Ecg {
                voltages: vec![0.1, -0.2, 0.9],
                heart_rate: Some(72.0),
            }
        );
    }

    #[test]
    fn test_heart_rate_is_optional_for_ecg() {
        let request = validate(SignalKind::Ecg, &json!({"voltages": [0.1]})).unwrap();
        assert!(matches!(request, AnalysisRequest::Ecg { heart_rate: None, .. }));
    }

    #[test]
    fn test_body_must_be_an_object() {
        let (field, _) = rejection(validate(SignalKind::Ecg, &json!([1, 2, 3])));
        assert_eq!(field, "body");

        let (field, _) = rejection(validate(SignalKind::Hrv, &Value::Null));
        assert_eq!(field, "body");
    }

    #[test]
    fn test_missing_series() {
        for kind in SignalKind::ALL {
            let (field, reason) = rejection(validate(kind, &json!({})));
            assert_eq!(field, kind.series_field());
            assert_eq!(reason, "missing");
        }
    }

    #[test]
    fn test_empty_series() {
        let (field, reason) = rejection(validate(SignalKind::Ecg, &json!({"voltages": []})));
        assert_eq!(field, "voltages");
        assert_eq!(reason, "must not be empty");
    }

    #[test]
    fn test_series_must_be_an_array() {
        let (_, reason) = rejection(validate(SignalKind::HeartRate, &json!({"bpm_values": "72,75"})));
        assert_eq!(reason, "expected an array");
    }

    #[test]
    fn test_series_elements_must_be_numbers() {
        let (_, reason) = rejection(validate(SignalKind::Hrv, &json!({"rr_intervals": [800, "810", 790]})));
        assert_eq!(reason, "element 1 is not a number");
    }

    #[test]
    fn test_glucose_elements_must_be_objects() {
        let (field, reason) = rejection(validate(SignalKind::Glucose, &json!({"glucose_data": [{"value": 90}, 95]})));
        assert_eq!(field, "glucose_data");
        assert_eq!(reason, "element 1 is not an object");
    }

    #[test]
    fn test_glucose_entries_are_normalized() {
        let request = validate(
            SignalKind::Glucose,
            &json!({"glucose_data": [{"glucoseValue": 110, "recorded_at": "08:00"}, {"note": "?"}]}),
        )
        .unwrap();
        let AnalysisRequest::Glucose { entries } = request else {
            panic!("expected a glucose request");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].value, 110.0);
        assert_eq!(entries[0].timestamp, "08:00");
        assert_eq!(entries[1].value, normalize::MISSING_VALUE);
    }

    #[test]
    fn test_optional_summary_fields() {
        let request = validate(
            SignalKind::HeartRate,
            &json!({"bpm_values": [70, 80], "min": 60, "max": null, "average": 75.5}),
        )
        .unwrap();
        assert_eq!(
            request,
            AnalysisRequest::HeartRate {
                bpm_values: vec![70.0, 80.0],
                min: Some(60.0),
                max: None,
                average: Some(75.5),
            }
        );

        let (field, reason) = rejection(validate(SignalKind::Hrv, &json!({"rr_intervals": [800], "sdnn": "high"})));
        assert_eq!(field, "sdnn");
        assert_eq!(reason, "expected a number");
    }
}
