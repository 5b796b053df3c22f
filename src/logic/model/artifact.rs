//! Artifact Bundle - Everything a model needs at inference time
//!
//! One JSON file carries the estimator, the model's column order, the
//! categorical vocabulary, IQR bounds and scaler parameters. The bundle's
//! SHA-256 is computed on load and optionally checked against a pinned value.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{InsightError, InsightResult};
use crate::logic::features::{CategoryVocabulary, IqrBounds, StandardScaler, NUMERIC_FIELDS};
use super::classifier::LogisticModel;
use super::tree::TreeEnsemble;

/// Estimator as serialized in the bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    TreeEnsemble(TreeEnsemble),
    Pipeline { steps: Vec<PipelineStep> },
    Logistic(LogisticModel),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PipelineStep {
    /// Training-time resampling (SMOTE and the like); a no-op at inference
    Resample {
        #[serde(default)]
        name: String,
    },
    Estimator { model: Box<ModelArtifact> },
}

impl ModelArtifact {
    pub fn kind_name(&self) -> &'static str {
        match self {
            ModelArtifact::TreeEnsemble(_) => "tree_ensemble",
            ModelArtifact::Pipeline { .. } => "pipeline",
            ModelArtifact::Logistic(_) => "logistic",
        }
    }

    /// Unwrap pipelines down to the estimator that produces predictions
    pub fn final_estimator(&self) -> InsightResult<&ModelArtifact> {
        match self {
            ModelArtifact::Pipeline { steps } => {
                for step in steps.iter().rev() {
                    match step {
                        PipelineStep::Estimator { model } => return model.final_estimator(),
                        PipelineStep::Resample { name } => {
                            log::debug!("Skipping resample step '{}' at inference", name);
                        }
                    }
                }
                Err(InsightError::InvalidModel("pipeline has no estimator step".into()))
            }
            other => Ok(other),
        }
    }
}

fn default_numeric_fields() -> Vec<String> {
    NUMERIC_FIELDS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Model column order at fit time
    pub feature_names: Vec<String>,
    #[serde(default = "default_numeric_fields")]
    pub numeric_fields: Vec<String>,
    pub categories: Vec<CategoryVocabulary>,
    #[serde(default)]
    pub iqr_bounds: BTreeMap<String, IqrBounds>,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
    pub model: ModelArtifact,
}

/// Hex-encoded SHA-256 of a byte slice
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

impl ArtifactBundle {
    pub fn from_json_bytes(bytes: &[u8]) -> InsightResult<Self> {
        serde_json::from_slice(bytes).map_err(InsightError::ArtifactParse)
    }

    /// Read and parse a bundle, returning it with its checksum.
    ///
    /// A pinned checksum is compared case-insensitively.
    pub fn load(path: &Path, expected_sha256: Option<&str>) -> InsightResult<(Self, String)> {
        if !path.exists() {
            return Err(InsightError::ArtifactNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        let checksum = sha256_hex(&bytes);

        if let Some(expected) = expected_sha256 {
            if !expected.trim().eq_ignore_ascii_case(&checksum) {
                return Err(InsightError::ChecksumMismatch {
                    expected: expected.trim().to_lowercase(),
                    actual: checksum,
                });
            }
        }

        let bundle = Self::from_json_bytes(&bytes)?;
        log::debug!(
            "Parsed bundle '{}' ({} columns, {})",
            bundle.name,
            bundle.feature_names.len(),
            bundle.model.kind_name()
        );
        Ok((bundle, checksum))
    }
}
