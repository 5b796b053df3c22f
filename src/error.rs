//! Error handling
//!
//! Two classes of failure flow through the crate:
//! - **Configuration** errors (bad artifact, column mismatch, unsupported model)
//!   are fatal at load time; the explanation feature is disabled, never retried.
//! - **Request** errors (bad field value, ambiguous SHAP shape) are reported back
//!   to the caller while the loaded model keeps serving.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::features::layout::LayoutMismatchError;

pub type InsightResult<T> = Result<T, InsightError>;

/// Which side of the fence an error falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Request,
}

#[derive(Debug, Error)]
pub enum InsightError {
    // Configuration errors
    #[error("Model artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("Failed to parse model artifact: {0}")]
    ArtifactParse(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Model expects column '{0}' which the preprocessing adapter cannot produce")]
    MissingColumn(String),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("Invalid model structure: {0}")]
    InvalidModel(String),

    #[error("Model type not supported for attribution: {0}")]
    UnsupportedModel(String),

    #[error("Explanation service not available: {0}")]
    ExplainerUnavailable(String),

    #[error("No model loaded")]
    NoModelLoaded,

    // Request errors
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Cannot determine positive-class attributions: {0}")]
    ShapeAmbiguity(String),

    #[error(
        "Local accuracy violated: base + sum(shap) = {reconstructed:.6}, \
         model margin = {margin:.6}"
    )]
    LocalAccuracy { reconstructed: f64, margin: f64 },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl InsightError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InsightError::ArtifactNotFound(_)
            | InsightError::ArtifactParse(_)
            | InsightError::Io(_)
            | InsightError::ChecksumMismatch { .. }
            | InsightError::MissingColumn(_)
            | InsightError::LayoutMismatch(_)
            | InsightError::InvalidModel(_)
            | InsightError::UnsupportedModel(_)
            | InsightError::ExplainerUnavailable(_)
            | InsightError::NoModelLoaded => ErrorKind::Configuration,

            InsightError::InvalidField { .. }
            | InsightError::MalformedInput(_)
            | InsightError::ShapeAmbiguity(_)
            | InsightError::LocalAccuracy { .. }
            | InsightError::Csv(_) => ErrorKind::Request,
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    pub fn invalid_field(field: &str, reason: impl Into<String>) -> Self {
        InsightError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
