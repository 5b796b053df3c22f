//! Raw Instance - Lead fields before encoding
//!
//! Kept next to the encoded vector purely for narrative generation
//! (display formatting, active-category detection). Never fed to the model.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{InsightError, InsightResult};
use super::layout::{PDAYS_NOT_CONTACTED, UNKNOWN_CATEGORY};

/// A single raw field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Interpret as a number; text is parsed after trimming
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) => Some(*n),
            RawValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }

    /// Case-insensitive "unknown" marker
    pub fn is_unknown(&self) -> bool {
        matches!(self, RawValue::Text(s) if s.trim().eq_ignore_ascii_case(UNKNOWN_CATEGORY))
    }

    /// Interpret as a category string
    pub fn as_category(&self) -> String {
        match self {
            RawValue::Number(n) => format_number(*n),
            RawValue::Text(s) => s.trim().to_string(),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Number(n) => write!(f, "{}", format_number(*n)),
            RawValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        RawValue::Number(value as f64)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// Integers print without a fractional part ("1500", not "1500.0")
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ============================================================================
// LEAD DEFAULTS
// ============================================================================

/// Default applied by callers when a lead field is absent
#[derive(Debug, Clone, Copy)]
pub enum FieldDefault {
    Number(i64),
    Text(&'static str),
}

/// Documented defaults for all 16 lead fields
pub const LEAD_DEFAULTS: &[(&str, FieldDefault)] = &[
    ("age", FieldDefault::Number(30)),
    ("balance", FieldDefault::Number(0)),
    ("day", FieldDefault::Number(1)),
    ("duration", FieldDefault::Number(0)),
    ("campaign", FieldDefault::Number(0)),
    ("pdays", FieldDefault::Number(PDAYS_NOT_CONTACTED)),
    ("previous", FieldDefault::Number(0)),
    ("job", FieldDefault::Text(UNKNOWN_CATEGORY)),
    ("marital", FieldDefault::Text(UNKNOWN_CATEGORY)),
    ("education", FieldDefault::Text(UNKNOWN_CATEGORY)),
    ("default", FieldDefault::Text("no")),
    ("housing", FieldDefault::Text("no")),
    ("loan", FieldDefault::Text("no")),
    ("contact", FieldDefault::Text(UNKNOWN_CATEGORY)),
    ("month", FieldDefault::Text("jan")),
    ("poutcome", FieldDefault::Text(UNKNOWN_CATEGORY)),
];

// ============================================================================
// RAW INSTANCE
// ============================================================================

/// Mapping from original field name to raw value
///
/// Field names are stored lower-cased and trimmed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInstance {
    fields: BTreeMap<String, RawValue>,
}

impl RawInstance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object; `null` values count as absent
    pub fn from_json(value: &serde_json::Value) -> InsightResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| {
                InsightError::MalformedInput("expected a JSON object of lead fields".into())
            })?;

        let mut instance = Self::new();
        for (key, value) in object {
            let raw = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::Number(n) => RawValue::Number(
                    n.as_f64()
                        .ok_or_else(|| InsightError::invalid_field(key, "number out of range"))?,
                ),
                serde_json::Value::String(s) => RawValue::Text(s.clone()),
                serde_json::Value::Bool(b) => RawValue::Text(b.to_string()),
                _ => {
                    return Err(InsightError::invalid_field(
                        key,
                        "expected a number or a string",
                    ))
                }
            };
            instance.insert(key, raw);
        }
        Ok(instance)
    }

    /// Insert a field, normalising the key
    pub fn insert(&mut self, field: &str, value: impl Into<RawValue>) {
        self.fields.insert(field.trim().to_ascii_lowercase(), value.into());
    }

    /// Builder-style insert
    pub fn with(mut self, field: &str, value: impl Into<RawValue>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&RawValue> {
        self.fields.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fill every absent lead field with its documented default
    pub fn apply_defaults(&mut self) {
        for (field, default) in LEAD_DEFAULTS {
            if !self.fields.contains_key(*field) {
                let value = match default {
                    FieldDefault::Number(n) => RawValue::Number(*n as f64),
                    FieldDefault::Text(s) => RawValue::Text((*s).to_string()),
                };
                self.fields.insert((*field).to_string(), value);
            }
        }
    }

    /// Category value for a field, lower-cased for comparison
    pub fn category(&self, field: &str) -> Option<String> {
        self.get(field).map(|v| v.as_category().to_lowercase())
    }

    /// Numeric value for a field.
    ///
    /// `Ok(None)` when absent or "unknown"; an error when present but not numeric.
    pub fn number(&self, field: &str) -> InsightResult<Option<f64>> {
        match self.get(field) {
            None => Ok(None),
            Some(v) if v.is_unknown() => Ok(None),
            Some(RawValue::Text(s)) if s.trim().is_empty() => Ok(None),
            Some(v) => v.as_number().map(Some).ok_or_else(|| {
                InsightError::invalid_field(field, format!("expected a number, got '{}'", v))
            }),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_object() {
        let json =
            serde_json::json!({ "Age": 45, "job": "retired", "pdays": null, "housing": false });
        let raw = RawInstance::from_json(&json).unwrap();
        assert_eq!(raw.get("age"), Some(&RawValue::Number(45.0)));
        assert_eq!(raw.category("job").as_deref(), Some("retired"));
        assert!(!raw.contains("pdays"));
        assert_eq!(raw.category("housing").as_deref(), Some("false"));
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = RawInstance::from_json(&serde_json::json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, InsightError::MalformedInput(_)));

        let err = RawInstance::from_json(&serde_json::json!({ "age": [1] })).unwrap_err();
        assert!(matches!(err, InsightError::InvalidField { .. }));
    }

    #[test]
    fn test_apply_defaults() {
        let mut raw = RawInstance::new().with("age", 45i64);
        raw.apply_defaults();
        assert_eq!(raw.len(), 16);
        assert_eq!(raw.number("age").unwrap(), Some(45.0));
        assert_eq!(raw.number("pdays").unwrap(), Some(-1.0));
        assert_eq!(raw.category("month").as_deref(), Some("jan"));
    }

    #[test]
    fn test_number_parsing() {
        let raw = RawInstance::new()
            .with("age", "42")
            .with("balance", "unknown")
            .with("duration", "abc");
        assert_eq!(raw.number("age").unwrap(), Some(42.0));
        assert_eq!(raw.number("balance").unwrap(), None);
        assert_eq!(raw.number("missing").unwrap(), None);
        assert!(raw.number("duration").is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1500.0), "1500");
        assert_eq!(format_number(-1.0), "-1");
        assert_eq!(format_number(2.5), "2.5");
    }
}
