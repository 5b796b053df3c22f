//! Preprocessing Adapter - Raw lead → model feature vector
//!
//! Built once per loaded artifact. The column plan is resolved at
//! construction: if the model expects a column the adapter cannot
//! produce, loading fails instead of every request.
//!
//! Per request:
//! 1. Canonicalise raw fields (numeric parsing, fill values, sentinels)
//! 2. Clip numerics to IQR bounds (silent)
//! 3. Standard-scale configured numerics
//! 4. One-hot expand categoricals
//! 5. Emit columns in model order

use std::collections::BTreeMap;

use crate::error::{InsightError, InsightResult};
use super::clipping::IqrBounds;
use super::encoder::CategoryVocabulary;
use super::layout::{
    FeatureLayout, CATEGORICAL_FIELDS, PDAYS_LEGACY_NOT_CONTACTED, PDAYS_NOT_CONTACTED,
    UNKNOWN_CATEGORY,
};
use super::raw::{RawInstance, RawValue};
use super::scaler::{standardize, StandardScaler};
use super::vector::FeatureVector;

/// Fill value for an absent or "unknown" numeric field
fn numeric_fill(field: &str) -> f64 {
    if field == "pdays" {
        PDAYS_NOT_CONTACTED as f64
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
struct NumericField {
    name: String,
    bounds: Option<IqrBounds>,
    scaling: Option<(f64, f64)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnSource {
    Numeric(usize),
    Dummy { field: usize, category: usize },
}

/// Encoded lead: canonical raw fields plus the model vector
#[derive(Debug, Clone)]
pub struct PreparedInstance {
    pub raw: RawInstance,
    pub vector: FeatureVector,
}

#[derive(Debug, Clone)]
pub struct PreprocessingAdapter {
    layout: FeatureLayout,
    numeric: Vec<NumericField>,
    categorical: Vec<CategoryVocabulary>,
    plan: Vec<ColumnSource>,
}

impl PreprocessingAdapter {
    /// Resolve the column plan for a model's expected input order
    pub fn new(
        feature_names: Vec<String>,
        numeric_fields: &[String],
        categories: &[CategoryVocabulary],
        iqr_bounds: &BTreeMap<String, IqrBounds>,
        scaler: Option<&StandardScaler>,
    ) -> InsightResult<Self> {
        if let Some(scaler) = scaler {
            scaler.validate()?;
        }

        let numeric: Vec<NumericField> = numeric_fields
            .iter()
            .map(|name| {
                let bounds = iqr_bounds.get(name).copied();
                if bounds.is_none() {
                    log::warn!(
                        "No IQR bounds for numeric field '{}', values will not be clipped",
                        name
                    );
                }
                NumericField {
                    name: name.clone(),
                    bounds,
                    scaling: scaler.and_then(|s| s.params(name)),
                }
            })
            .collect();

        let mut plan = Vec::with_capacity(feature_names.len());
        for column in &feature_names {
            let source = if let Some(i) = numeric.iter().position(|f| &f.name == column) {
                ColumnSource::Numeric(i)
            } else {
                categories
                    .iter()
                    .enumerate()
                    .find_map(|(field, vocab)| {
                        vocab
                            .column_names()
                            .position(|name| &name == column)
                            .map(|category| ColumnSource::Dummy { field, category })
                    })
                    .ok_or_else(|| InsightError::MissingColumn(column.clone()))?
            };
            plan.push(source);
        }

        let producible = numeric.len()
            + categories.iter().map(|c| c.values.len()).sum::<usize>();
        if producible > plan.len() {
            log::debug!(
                "Adapter can produce {} columns, model uses {}; extras are dropped",
                producible,
                plan.len()
            );
        }

        Ok(Self {
            layout: FeatureLayout::new(feature_names),
            numeric,
            categorical: categories.to_vec(),
            plan,
        })
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Apply fill values and sentinels so the narrative sees what the model saw.
    ///
    /// Numeric fields become integers; "unknown" categories become "unknown".
    pub fn canonicalize(&self, raw: &RawInstance) -> InsightResult<RawInstance> {
        let mut canonical = raw.clone();

        for field in &self.numeric {
            let mut value = raw
                .number(&field.name)?
                .map(f64::trunc)
                .unwrap_or_else(|| numeric_fill(&field.name));
            if field.name == "pdays" && value == PDAYS_LEGACY_NOT_CONTACTED as f64 {
                value = PDAYS_NOT_CONTACTED as f64;
            }
            canonical.insert(&field.name, RawValue::Number(value));
        }

        for field in CATEGORICAL_FIELDS {
            let value = match raw.get(field) {
                Some(v) if !v.is_unknown() && !v.as_category().is_empty() => v.as_category(),
                _ => UNKNOWN_CATEGORY.to_string(),
            };
            canonical.insert(field, RawValue::Text(value));
        }

        Ok(canonical)
    }

    /// Encode a canonical instance in model column order
    fn encode(&self, canonical: &RawInstance) -> InsightResult<FeatureVector> {
        let mut numeric_values = Vec::with_capacity(self.numeric.len());
        for field in &self.numeric {
            let mut value = canonical
                .number(&field.name)?
                .unwrap_or_else(|| numeric_fill(&field.name));
            if let Some(bounds) = field.bounds {
                value = bounds.clip(value);
            }
            if let Some(params) = field.scaling {
                value = standardize(value, params);
            }
            numeric_values.push(value);
        }

        let active: Vec<Option<usize>> = self
            .categorical
            .iter()
            .map(|vocab| {
                canonical
                    .get(&vocab.field)
                    .and_then(|v| vocab.resolve(&v.as_category()))
            })
            .collect();

        let values = self
            .plan
            .iter()
            .map(|source| match *source {
                ColumnSource::Numeric(i) => numeric_values[i],
                ColumnSource::Dummy { field, category } => {
                    if active[field] == Some(category) {
                        1.0
                    } else {
                        0.0
                    }
                }
            })
            .collect();

        Ok(FeatureVector::from_values(&self.layout, values)?)
    }

    /// Canonicalise and encode one lead
    pub fn prepare(&self, raw: &RawInstance) -> InsightResult<PreparedInstance> {
        let canonical = self.canonicalize(raw)?;
        let vector = self.encode(&canonical)?;
        Ok(PreparedInstance { raw: canonical, vector })
    }

    /// Encode one lead, discarding the canonical fields
    pub fn transform(&self, raw: &RawInstance) -> InsightResult<FeatureVector> {
        Ok(self.prepare(raw)?.vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter(feature_names: &[&str]) -> InsightResult<PreprocessingAdapter> {
        let numeric = vec!["age".to_string(), "balance".to_string(), "pdays".to_string()];
        let categories = vec![
            CategoryVocabulary::new("job", &["admin.", "retired", "unknown"]),
            CategoryVocabulary::new("marital", &["married", "single"]),
        ];
        let mut bounds = BTreeMap::new();
        bounds.insert("age".to_string(), IqrBounds::new(18.0, 70.0));
        bounds.insert("balance".to_string(), IqrBounds::new(-2000.0, 4000.0));
        let scaler = StandardScaler {
            columns: vec!["balance".into(), "age".into()],
            mean: vec![1000.0, 40.0],
            scale: vec![500.0, 10.0],
        };
        PreprocessingAdapter::new(
            feature_names.iter().map(|s| s.to_string()).collect(),
            &numeric,
            &categories,
            &bounds,
            Some(&scaler),
        )
    }

    #[test]
    fn test_missing_column_fails_fast() {
        let err = adapter(&["age", "job_astronaut"]).unwrap_err();
        assert!(matches!(err, InsightError::MissingColumn(ref c) if c == "job_astronaut"));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_column_order_follows_model() {
        let adapter = adapter(&["marital_single", "balance", "job_retired", "age"]).unwrap();
        let raw = RawInstance::new()
            .with("age", 50i64)
            .with("balance", 1500i64)
            .with("job", "Retired")
            .with("marital", "single");
        let vector = adapter.transform(&raw).unwrap();
        assert_eq!(vector.values, vec![1.0, 1.0, 1.0, 1.0]);
        assert!(vector.validate(adapter.layout()).is_ok());
    }

    #[test]
    fn test_clipping_before_scaling() {
        let adapter = adapter(&["age", "balance"]).unwrap();
        let raw = RawInstance::new().with("age", 95i64).with("balance", 100_000i64);
        let vector = adapter.transform(&raw).unwrap();
        // age clipped to 70 → (70-40)/10, balance clipped to 4000 → (4000-1000)/500
        assert_eq!(vector.values, vec![3.0, 6.0]);
    }

    #[test]
    fn test_unknown_category_handling() {
        let adapter = adapter(&[
            "job_admin.",
            "job_retired",
            "job_unknown",
            "marital_married",
            "marital_single",
        ])
        .unwrap();

        // job has an explicit unknown bucket, marital does not
        let raw = RawInstance::new().with("job", "UNKNOWN").with("marital", "Unknown");
        let vector = adapter.transform(&raw).unwrap();
        assert_eq!(vector.values, vec![0.0, 0.0, 1.0, 0.0, 0.0]);

        // Out-of-vocabulary values activate nothing
        let raw = RawInstance::new().with("job", "astronaut").with("marital", "widowed");
        let vector = adapter.transform(&raw).unwrap();
        assert_eq!(vector.values, vec![0.0; 5]);
    }

    #[test]
    fn test_canonicalize_numeric() {
        let adapter = adapter(&["age", "pdays"]).unwrap();
        let raw = RawInstance::new().with("age", "41.9").with("pdays", 999i64);
        let canonical = adapter.canonicalize(&raw).unwrap();
        assert_eq!(canonical.number("age").unwrap(), Some(41.0));
        assert_eq!(canonical.number("pdays").unwrap(), Some(-1.0));
        // Absent balance gets its fill value
        assert_eq!(canonical.number("balance").unwrap(), Some(0.0));
        assert_eq!(canonical.category("job").as_deref(), Some("unknown"));
    }

    #[test]
    fn test_invalid_numeric_is_request_error() {
        let adapter = adapter(&["age"]).unwrap();
        let raw = RawInstance::new().with("age", "forty");
        let err = adapter.transform(&raw).unwrap_err();
        assert!(!err.is_configuration());
    }
}
