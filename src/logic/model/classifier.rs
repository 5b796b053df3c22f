//! Classifier - Positive-class probability capability
//!
//! Every supported estimator is adapted once at load time behind
//! `predict_probability`; callers never branch on the model kind.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{InsightError, InsightResult};
use super::tree::TreeEnsemble;

/// Numerically stable logistic function
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

pub trait Classifier: Send + Sync {
    /// Probability of the positive class for an encoded row
    fn predict_probability(&self, features: &[f64]) -> f64;

    /// Short name for status output
    fn kind(&self) -> &'static str;
}

// ============================================================================
// TREE ENSEMBLE
// ============================================================================

/// Sigmoid over the positive-class margin
#[derive(Debug, Clone)]
pub struct TreeClassifier {
    ensemble: Arc<TreeEnsemble>,
    positive_output: usize,
}

impl TreeClassifier {
    pub fn new(ensemble: Arc<TreeEnsemble>) -> InsightResult<Self> {
        let positive_output = ensemble.positive_output()?;
        Ok(Self { ensemble, positive_output })
    }

    pub fn margin(&self, features: &[f64]) -> f64 {
        self.ensemble.margins(features)[self.positive_output]
    }
}

impl Classifier for TreeClassifier {
    fn predict_probability(&self, features: &[f64]) -> f64 {
        sigmoid(self.margin(features))
    }

    fn kind(&self) -> &'static str {
        "tree_ensemble"
    }
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    #[serde(default)]
    pub intercept: f64,
}

impl LogisticModel {
    pub fn validate(&self, n_features: usize) -> InsightResult<()> {
        if self.weights.len() != n_features {
            return Err(InsightError::InvalidModel(format!(
                "logistic model has {} weights for {} features",
                self.weights.len(),
                n_features
            )));
        }
        Ok(())
    }
}

impl Classifier for LogisticModel {
    fn predict_probability(&self, features: &[f64]) -> f64 {
        let z: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        sigmoid(z)
    }

    fn kind(&self) -> &'static str {
        "logistic"
    }
}
