//! Alias resolution for structured glucose entries.
//!
//! Client apps send the same reading under different key names depending on the device vendor.
//! Each canonical field has an ordered alias list; the first alias that is present and non-null
//! wins. Entries never get dropped here, an unresolved value becomes [`MISSING_VALUE`] and is
//! filtered later by the statistics stage.

use serde_json::{Map, Value};

/// Sentinel for an entry whose value could not be resolved.
pub const MISSING_VALUE: f64 = 0.0;

/// Placeholder for an entry whose timestamp could not be resolved.
pub const UNKNOWN_TIMESTAMP: &str = "unknown";

/// Ordered key aliases for one canonical field.
#[derive(Debug, Clone, Copy)]
pub struct FieldAliases {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

impl FieldAliases {
    /// First present, non-null value in precedence order.
    pub fn resolve<'a>(&self, entry: &'a Map<String, Value>) -> Option<&'a Value> {
        self.aliases
            .iter()
            .filter_map(|alias| entry.get(*alias))
            .find(|value| !value.is_null())
    }
}

pub const GLUCOSE_VALUE: FieldAliases = FieldAliases {
    canonical: "value",
    aliases: &["glucoseValue", "blood_glucose", "value"],
};

pub const GLUCOSE_TIMESTAMP: FieldAliases = FieldAliases {
    canonical: "timestamp",
    aliases: &["timestamp", "recorded_at", "dateTime"],
};

/// One glucose measurement in canonical form.
#[derive(Debug, Clone, PartialEq)]
pub struct GlucoseEntry {
    /// mg/dL, or [`MISSING_VALUE`]
    pub value: f64,
    pub timestamp: String,
}

impl GlucoseEntry {
    pub fn from_json(entry: &Map<String, Value>) -> Self {
        let value = GLUCOSE_VALUE.resolve(entry).and_then(as_number).unwrap_or(MISSING_VALUE);
        let timestamp = GLUCOSE_TIMESTAMP
            .resolve(entry)
            .and_then(as_timestamp)
            .unwrap_or_else(|| UNKNOWN_TIMESTAMP.to_string());

        Self { value, timestamp }
    }
}

/// Normalize every entry, preserving length and order.
pub fn glucose_entries(raw: &[&Map<String, Value>]) -> Vec<GlucoseEntry> {
    raw.iter().map(|entry| GlucoseEntry::from_json(entry)).collect()
}

// Numbers, or strings holding a number (some meters export "104")
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn as_timestamp(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(value: Value) -> GlucoseEntry {
        GlucoseEntry::from_json(value.as_object().expect("test entry is an object"))
    }

    #[test]
    fn test_every_value_alias_resolves_the_same() {
        let a = entry(json!({"glucoseValue": 100, "timestamp": "t"}));
        let b = entry(json!({"blood_glucose": 100, "timestamp": "t"}));
        let c = entry(json!({"value": 100, "timestamp": "t"}));
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.value, 100.0);
    }

    #[test]
    fn test_alias_precedence() {
        let e = entry(json!({"value": 1, "blood_glucose": 2, "glucoseValue": 3}));
        assert_eq!(e.value, 3.0);

        let e = entry(json!({"value": 1, "blood_glucose": 2}));
        assert_eq!(e.value, 2.0);

        let e = entry(json!({"dateTime": "c", "recorded_at": "b", "timestamp": "a"}));
        assert_eq!(e.timestamp, "a");
    }

    #[test]
    fn test_null_alias_falls_through() {
        let e = entry(json!({"glucoseValue": null, "blood_glucose": 88, "timestamp": null, "recorded_at": "2024-05-01T08:00:00Z"}));
        assert_eq!(e.value, 88.0);
        assert_eq!(e.timestamp, "2024-05-01T08:00:00Z");
    }

    #[test]
    fn test_missing_fields_become_sentinels() {
        let e = entry(json!({"note": "after breakfast"}));
        assert_eq!(e.value, MISSING_VALUE);
        assert_eq!(e.timestamp, UNKNOWN_TIMESTAMP);
    }

    #[test]
    fn test_numeric_strings_and_numeric_timestamps() {
        let e = entry(json!({"value": " 104.5 ", "timestamp": 1714550400}));
        assert_eq!(e.value, 104.5);
        assert_eq!(e.timestamp, "1714550400");

        let e = entry(json!({"value": "high", "timestamp": true}));
        assert_eq!(e.value, MISSING_VALUE);
        assert_eq!(e.timestamp, UNKNOWN_TIMESTAMP);
    }

    #[test]
    fn test_length_is_preserved() {
        let raw = [json!({"value": 90}), json!({}), json!({"blood_glucose": 0})];
        let maps: Vec<_> = raw.iter().filter_map(Value::as_object).collect();
        let entries = glucose_entries(&maps);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries.iter().map(|e| e.value).collect::<Vec<_>>(), vec![90.0, 0.0, 0.0]);
    }
}
