//! Attribution Engine - Per-feature Shapley values for one lead
//!
//! Wraps an attribution backend built once per loaded model. The backend is
//! constructed over the bare tree estimator (pipelines are unwrapped); any
//! other estimator disables explanations for that model.

use std::sync::Arc;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use crate::error::{InsightError, InsightResult};
use crate::logic::features::{FeatureLayout, FeatureVector};
use crate::logic::model::TreeEnsemble;
use super::shape::{ClassValues, ShapOutput};
use super::tree_shap::TreeShapExplainer;

/// Default tolerance for `base + Σ shap == margin`
pub const DEFAULT_LOCAL_ACCURACY_TOLERANCE: f64 = 1e-4;

/// Something that can attribute a model's margin to its inputs
pub trait AttributionBackend: Send + Sync {
    /// Expected margin over the training distribution
    fn expected_value(&self) -> ClassValues;

    /// Raw margin for one encoded row
    fn margin(&self, x: &[f64]) -> ClassValues;

    /// Attributions for a `(samples, features)` batch
    fn shap_values(&self, batch: ArrayView2<'_, f64>) -> InsightResult<ShapOutput>;
}

/// Shapley value of one model column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureAttribution {
    pub feature_name: String,
    pub shap_value: f64,
}

pub struct AttributionEngine {
    backend: Box<dyn AttributionBackend>,
    layout: FeatureLayout,
    base_value: f64,
    tolerance: f64,
}

impl std::fmt::Debug for AttributionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributionEngine")
            .field("features", &self.layout.len())
            .field("base_value", &self.base_value)
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl AttributionEngine {
    /// Build over an ensemble already shared with the classifier
    pub fn from_ensemble(
        ensemble: Arc<TreeEnsemble>,
        layout: FeatureLayout,
        tolerance: f64,
    ) -> InsightResult<Self> {
        if ensemble.n_features != layout.len() {
            return Err(InsightError::InvalidModel(format!(
                "ensemble expects {} features but the layout has {}",
                ensemble.n_features,
                layout.len()
            )));
        }
        let backend = TreeShapExplainer::new(ensemble)?;
        Self::with_backend(Box::new(backend), layout, tolerance)
    }

    pub fn with_backend(
        backend: Box<dyn AttributionBackend>,
        layout: FeatureLayout,
        tolerance: f64,
    ) -> InsightResult<Self> {
        // An ambiguous expected value makes the model unexplainable, not one request
        let base_value = backend.expected_value().positive().map_err(|e| {
            InsightError::UnsupportedModel(format!("cannot resolve expected value: {}", e))
        })?;
        log::info!(
            "Attribution engine ready: {} features, base value {:.6}",
            layout.len(),
            base_value
        );
        Ok(Self { backend, layout, base_value, tolerance })
    }

    /// Expected log-odds of the positive class
    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Shapley values for one instance, in model column order
    pub fn attribute(&self, vector: &FeatureVector) -> InsightResult<Vec<FeatureAttribution>> {
        vector.validate(&self.layout)?;

        let batch = Array2::from_shape_vec((1, vector.len()), vector.as_slice().to_vec())
            .map_err(|e| InsightError::MalformedInput(e.to_string()))?;
        let output = self.backend.shap_values(batch.view())?;
        let row = output.positive_row(self.layout.len())?;

        self.check_local_accuracy(vector.as_slice(), row.sum())?;

        Ok(self
            .layout
            .names()
            .iter()
            .zip(row.iter())
            .map(|(name, &shap_value)| FeatureAttribution {
                feature_name: name.clone(),
                shap_value,
            })
            .collect())
    }

    fn check_local_accuracy(&self, x: &[f64], shap_sum: f64) -> InsightResult<()> {
        let margin = self.backend.margin(x).positive()?;
        let reconstructed = self.base_value + shap_sum;
        if (reconstructed - margin).abs() > self.tolerance {
            log::warn!(
                "Local accuracy check failed: {:.6} vs margin {:.6}",
                reconstructed,
                margin
            );
            return Err(InsightError::LocalAccuracy { reconstructed, margin });
        }
        Ok(())
    }
}
