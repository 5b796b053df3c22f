//! Feature Vector - Core data structure for ML input
//!
//! **Layout-stamped feature vector**
//!
//! Every vector carries the hash of the layout it was built for, so the
//! model and the attribution engine can refuse vectors from a different
//! artifact instead of silently mis-reading columns.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::layout::{FeatureLayout, LayoutMismatchError};

// ============================================================================
// LAYOUT-STAMPED FEATURE VECTOR
// ============================================================================

/// Feature vector with layout metadata
///
/// Built by the preprocessing adapter; never construct one from a raw
/// `Vec<f64>` without going through a `FeatureLayout`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// CRC32 hash of the feature layout (for mismatch detection)
    pub layout_hash: u32,
    /// Feature values in layout order
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Create from values already in layout order
    pub fn from_values(
        layout: &FeatureLayout,
        values: Vec<f64>,
    ) -> Result<Self, LayoutMismatchError> {
        layout.validate(layout.hash(), values.len())?;
        Ok(Self {
            layout_hash: layout.hash(),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get values as slice
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Validate that this vector is compatible with a layout
    pub fn validate(&self, layout: &FeatureLayout) -> Result<(), LayoutMismatchError> {
        layout.validate(self.layout_hash, self.values.len())
    }

    /// Convert to JSON-serializable format for logging
    pub fn to_log_entry(&self, layout: &FeatureLayout) -> serde_json::Value {
        serde_json::json!({
            "layout_hash": self.layout_hash,
            "values": self.values,
            "named_values": layout.names().iter()
                .zip(self.values.iter())
                .map(|(name, value)| (name.clone(), *value))
                .collect::<HashMap<_, _>>(),
        })
    }
}

// Test helpers
#[cfg(test)]
impl FeatureVector {
    pub fn zeros(layout: &FeatureLayout) -> Self {
        Self {
            layout_hash: layout.hash(),
            values: vec![0.0; layout.len()],
        }
    }

    pub fn get_by_name(&self, layout: &FeatureLayout, name: &str) -> Option<f64> {
        layout.index_of(name).and_then(|i| self.values.get(i).copied())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> FeatureLayout {
        FeatureLayout::new(vec!["age".into(), "balance".into(), "job_retired".into()])
    }

    #[test]
    fn test_feature_vector_zeros() {
        let layout = layout();
        let vector = FeatureVector::zeros(&layout);
        assert_eq!(vector.layout_hash, layout.hash());
        assert_eq!(vector.len(), 3);
        assert!(vector.validate(&layout).is_ok());
    }

    #[test]
    fn test_feature_vector_from_values_length_checked() {
        let layout = layout();
        assert!(FeatureVector::from_values(&layout, vec![1.0, 2.0, 0.0]).is_ok());
        assert!(FeatureVector::from_values(&layout, vec![1.0, 2.0]).is_err());
    }

    #[test]
    fn test_feature_vector_by_name() {
        let layout = layout();
        let vector = FeatureVector::from_values(&layout, vec![45.0, 1500.0, 0.0]).unwrap();
        assert_eq!(vector.get_by_name(&layout, "balance"), Some(1500.0));
        assert_eq!(vector.get_by_name(&layout, "nonexistent"), None);
    }

    #[test]
    fn test_foreign_layout_rejected() {
        let layout = layout();
        let other = FeatureLayout::new(vec!["balance".into(), "age".into(), "job_retired".into()]);
        let vector = FeatureVector::zeros(&other);
        assert!(vector.validate(&layout).is_err());
    }

    #[test]
    fn test_to_log_entry() {
        let layout = layout();
        let vector = FeatureVector::from_values(&layout, vec![45.0, 1500.0, 1.0]).unwrap();
        let log = vector.to_log_entry(&layout);
        assert_eq!(log["named_values"]["age"], 45.0);
        assert!(log["layout_hash"].as_u64().is_some());
    }
}
