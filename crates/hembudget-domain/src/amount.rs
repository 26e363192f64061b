//! Lenient handling of stored budget/actual amounts.
//!
//! Stored amounts are never trusted to be well formed: older data files hold
//! strings such as `"N/A"`, nulls, or negative numbers. Loading must not fail
//! because of a single bad field, so every stored amount passes through
//! [`normalize`] and unreadable values become `0.0`.

use serde::{de::IgnoredAny, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawAmount {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Clamps a stored amount into the valid range: finite and non-negative.
pub fn normalize(value: f64) -> f64 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        0.0
    }
}

/// Parses a textual amount (`"12.5"`, `" 40 "`, `"3,5"`). Returns `None` for anything else.
pub fn parse_text(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<f64>()
        .or_else(|_| trimmed.replace(',', ".").parse::<f64>())
        .ok()
}

/// Serde hook for amount fields: numbers and numeric strings are kept, everything else is `0.0`.
pub fn lenient<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    let value = match raw {
        Some(RawAmount::Number(value)) => value,
        Some(RawAmount::Text(text)) => parse_text(&text).unwrap_or(0.0),
        Some(RawAmount::Other(_)) | None => 0.0,
    };
    Ok(normalize(value))
}

/// Returns `true` when `value` may be stored as a budget or actual amount.
pub fn is_valid(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Field {
        #[serde(default, deserialize_with = "lenient")]
        value: f64,
    }

    fn read(json: &str) -> f64 {
        serde_json::from_str::<Field>(json).unwrap().value
    }

    #[test]
    fn keeps_numbers_and_numeric_strings() {
        assert_eq!(read(r#"{"value": 12.5}"#), 12.5);
        assert_eq!(read(r#"{"value": 40}"#), 40.0);
        assert_eq!(read(r#"{"value": "99.9"}"#), 99.9);
        assert_eq!(read(r#"{"value": "3,5"}"#), 3.5);
    }

    #[test]
    fn coerces_garbage_to_zero() {
        assert_eq!(read(r#"{"value": "N/A"}"#), 0.0);
        assert_eq!(read(r#"{"value": null}"#), 0.0);
        assert_eq!(read(r#"{"value": true}"#), 0.0);
        assert_eq!(read(r#"{"value": [1, 2]}"#), 0.0);
        assert_eq!(read(r#"{"value": {"nested": 1}}"#), 0.0);
        assert_eq!(read(r#"{}"#), 0.0);
    }

    #[test]
    fn clamps_negative_values() {
        assert_eq!(read(r#"{"value": -20}"#), 0.0);
        assert_eq!(read(r#"{"value": "-5"}"#), 0.0);
    }

    #[test]
    fn validity_rejects_negative_and_non_finite() {
        assert!(is_valid(0.0));
        assert!(is_valid(10.0));
        assert!(!is_valid(-0.01));
        assert!(!is_valid(f64::NAN));
        assert!(!is_valid(f64::INFINITY));
    }
}
