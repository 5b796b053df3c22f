//! Lead Commands - Request-level API over the loaded model
//!
//! Each command takes a lead as a JSON object of raw fields, fills absent
//! fields with their documented defaults and runs the shared pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::{ErrorKind, InsightError, InsightResult};
use crate::logic::dataset::{self, BatchSummary, RowFailure};
use crate::logic::explain::{ExplanationResult, NarrativeBuilder};
use crate::logic::features::{PreparedInstance, RawInstance};
use crate::logic::model::{LoadedModel, ModelMetadata, ModelRegistry, ModelStatus};
use super::engine_status::EngineStatus;

// ============================================================================
// RESPONSES
// ============================================================================

/// Failure payload returned by every command
#[derive(Debug, Clone, Serialize)]
pub struct CommandError {
    pub success: bool,
    pub error: String,
    pub kind: ErrorKind,
}

impl From<InsightError> for CommandError {
    fn from(e: InsightError) -> Self {
        Self {
            success: false,
            kind: e.kind(),
            error: e.to_string(),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub success: bool,
    pub prediction: f64,
    pub prediction_pct: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExplainResponse {
    pub success: bool,
    pub prediction: f64,
    pub prediction_pct: f64,
    #[serde(flatten)]
    pub explanation: ExplanationResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: BatchSummary,
    pub mean_score: Option<f64>,
    pub rows: Vec<Value>,
    pub failures: Vec<RowFailure>,
}

/// Render a command outcome as the JSON payload callers see
pub fn to_json<T: Serialize>(result: &CommandResult<T>) -> Value {
    let rendered = match result {
        Ok(response) => serde_json::to_value(response),
        Err(error) => serde_json::to_value(error),
    };
    rendered.unwrap_or_else(|e| {
        serde_json::json!({ "success": false, "error": e.to_string(), "kind": ErrorKind::Request })
    })
}

// ============================================================================
// SERVICE
// ============================================================================

/// Owns the model registry and the narrative settings
#[derive(Debug)]
pub struct LeadService {
    registry: ModelRegistry,
    narrative: NarrativeBuilder,
    model_path: PathBuf,
    model_sha256: Option<String>,
    tolerance: f64,
}

impl LeadService {
    /// Service with no model loaded yet
    pub fn new(config: &Config) -> Self {
        Self {
            registry: ModelRegistry::new(),
            narrative: NarrativeBuilder::new(config.narrative.clone()),
            model_path: config.model_path.clone(),
            model_sha256: config.model_sha256.clone(),
            tolerance: config.local_accuracy_tolerance,
        }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Load (or reload) the configured artifact
    pub fn load_model(&self) -> CommandResult<ModelMetadata> {
        self.load_model_from(&self.model_path)
    }

    /// Load an artifact from `path`; on failure the current model keeps serving
    pub fn load_model_from(&self, path: &Path) -> CommandResult<ModelMetadata> {
        let model = self
            .registry
            .reload(path, self.model_sha256.as_deref(), self.tolerance)?;
        Ok(model.metadata().clone())
    }

    fn prepare(&self, lead: &Value) -> InsightResult<(Arc<LoadedModel>, PreparedInstance)> {
        let model = self.registry.current()?;
        let mut raw = RawInstance::from_json(lead)?;
        raw.apply_defaults();
        let prepared = model.adapter().prepare(&raw)?;
        Ok((model, prepared))
    }

    /// Positive-class probability for one lead
    pub fn predict_lead(&self, lead: &Value) -> CommandResult<PredictionResponse> {
        let run = || -> InsightResult<PredictionResponse> {
            let (model, prepared) = self.prepare(lead)?;
            let prediction = model.predict(&prepared.vector)?;
            Ok(PredictionResponse {
                success: true,
                prediction,
                prediction_pct: prediction * 100.0,
            })
        };
        run().map_err(|e| {
            log::warn!("Prediction failed: {}", e);
            CommandError::from(e)
        })
    }

    /// Probability plus the ranked, narrated attributions for one lead
    pub fn explain_lead(&self, lead: &Value) -> CommandResult<ExplainResponse> {
        let run = || -> InsightResult<ExplainResponse> {
            let (model, prepared) = self.prepare(lead)?;
            log::debug!(
                "Encoded lead: {}",
                prepared.vector.to_log_entry(model.adapter().layout())
            );
            let engine = model.explainer()?;
            let prediction = model.predict(&prepared.vector)?;
            let attributions = engine.attribute(&prepared.vector)?;
            let explanation =
                self.narrative
                    .build(&attributions, &prepared.raw, engine.base_value());

            log::info!("Explain completed for prediction: {:.2}%", prediction * 100.0);
            Ok(ExplainResponse {
                success: true,
                prediction,
                prediction_pct: prediction * 100.0,
                explanation,
            })
        };
        run().map_err(|e| {
            log::warn!("Explanation failed: {}", e);
            CommandError::from(e)
        })
    }

    /// Score every row of a lead file
    pub fn score_csv(&self, path: &Path, limit: Option<usize>) -> CommandResult<BatchResponse> {
        let run = || -> InsightResult<BatchResponse> {
            let model = self.registry.current()?;
            let report = dataset::score_file(&model, path, limit)?;
            Ok(BatchResponse {
                success: true,
                summary: report.summary(),
                mean_score: report.mean_score(),
                rows: report.rows_json(),
                failures: report.failures,
            })
        };
        run().map_err(|e| {
            log::warn!("Batch scoring of {} failed: {}", path.display(), e);
            CommandError::from(e)
        })
    }

    pub fn model_status(&self) -> ModelStatus {
        self.registry.status()
    }

    pub fn engine_status(&self) -> EngineStatus {
        let layout = self
            .registry
            .current()
            .ok()
            .map(|model| model.adapter().layout().info());
        EngineStatus::new(
            self.model_status(),
            layout,
            self.narrative.config().clone(),
            self.tolerance,
        )
    }
}
