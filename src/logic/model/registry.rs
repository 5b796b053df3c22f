//! Model Registry - Loaded bundle with atomic swap on reload
//!
//! A `LoadedModel` is built completely (adapter, classifier, explainer)
//! before it becomes visible. Readers clone the `Arc` and keep using their
//! snapshot even if a reload swaps in a new model mid-request.

use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{InsightError, InsightResult};
use crate::logic::attribution::AttributionEngine;
use crate::logic::features::{FeatureVector, PreprocessingAdapter};
use super::artifact::{ArtifactBundle, ModelArtifact};
use super::classifier::{Classifier, TreeClassifier};

/// Model metadata for status output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub version: Option<String>,
    pub source: String,
    pub checksum: String,
    pub model_kind: String,
    pub feature_count: usize,
    pub layout_hash: u32,
    pub explainer_available: bool,
    pub explainer_error: Option<String>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

enum ExplainerState {
    Ready(AttributionEngine),
    Unavailable(String),
}

/// Immutable, fully-built model bundle
pub struct LoadedModel {
    metadata: ModelMetadata,
    adapter: PreprocessingAdapter,
    classifier: Box<dyn Classifier>,
    explainer: ExplainerState,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl LoadedModel {
    /// Assemble a bundle; configuration errors abort, an unexplainable
    /// estimator only disables explanations.
    pub fn from_bundle(
        bundle: ArtifactBundle,
        source: &str,
        checksum: String,
        tolerance: f64,
    ) -> InsightResult<Self> {
        let adapter = PreprocessingAdapter::new(
            bundle.feature_names.clone(),
            &bundle.numeric_fields,
            &bundle.categories,
            &bundle.iqr_bounds,
            bundle.scaler.as_ref(),
        )?;
        let layout = adapter.layout().clone();

        let (classifier, explainer): (Box<dyn Classifier>, ExplainerState) =
            match bundle.model.final_estimator()? {
                ModelArtifact::TreeEnsemble(ensemble) => {
                    ensemble.validate()?;
                    if ensemble.n_features != layout.len() {
                        return Err(InsightError::InvalidModel(format!(
                            "ensemble expects {} features, bundle lists {} columns",
                            ensemble.n_features,
                            layout.len()
                        )));
                    }
                    let shared = Arc::new(ensemble.clone());
                    let classifier = TreeClassifier::new(Arc::clone(&shared))?;
                    let engine =
                        AttributionEngine::from_ensemble(shared, layout.clone(), tolerance);
                    let explainer = match engine {
                        Ok(engine) => ExplainerState::Ready(engine),
                        Err(e) => ExplainerState::Unavailable(e.to_string()),
                    };
                    (Box::new(classifier) as Box<dyn Classifier>, explainer)
                }
                ModelArtifact::Logistic(model) => {
                    model.validate(layout.len())?;
                    let reason =
                        InsightError::UnsupportedModel(model.kind().to_string()).to_string();
                    (
                        Box::new(model.clone()) as Box<dyn Classifier>,
                        ExplainerState::Unavailable(reason),
                    )
                }
                ModelArtifact::Pipeline { .. } => {
                    return Err(InsightError::InvalidModel(
                        "pipeline did not resolve to an estimator".into(),
                    ))
                }
            };

        let explainer_error = match &explainer {
            ExplainerState::Ready(_) => None,
            ExplainerState::Unavailable(reason) => {
                log::warn!("Explanations disabled for '{}': {}", bundle.name, reason);
                Some(reason.clone())
            }
        };

        let metadata = ModelMetadata {
            name: bundle.name.clone(),
            version: bundle.version.clone(),
            source: source.to_string(),
            checksum,
            model_kind: bundle.model.kind_name().to_string(),
            feature_count: layout.len(),
            layout_hash: layout.hash(),
            explainer_available: explainer_error.is_none(),
            explainer_error,
            loaded_at: chrono::Utc::now(),
        };

        log::info!(
            "Model '{}' loaded ({} features, layout {:08x}, {})",
            metadata.name,
            metadata.feature_count,
            metadata.layout_hash,
            classifier.kind()
        );

        Ok(Self { metadata, adapter, classifier, explainer })
    }

    /// Read, verify and assemble a bundle from disk
    pub fn load(path: &Path, expected_sha256: Option<&str>, tolerance: f64) -> InsightResult<Self> {
        log::info!("Loading model bundle from: {}", path.display());
        let (bundle, checksum) = ArtifactBundle::load(path, expected_sha256)?;
        Self::from_bundle(bundle, &path.display().to_string(), checksum, tolerance)
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn adapter(&self) -> &PreprocessingAdapter {
        &self.adapter
    }

    pub fn explainer(&self) -> InsightResult<&AttributionEngine> {
        match &self.explainer {
            ExplainerState::Ready(engine) => Ok(engine),
            ExplainerState::Unavailable(reason) => {
                Err(InsightError::ExplainerUnavailable(reason.clone()))
            }
        }
    }

    /// Positive-class probability for an encoded lead
    pub fn predict(&self, vector: &FeatureVector) -> InsightResult<f64> {
        vector.validate(self.adapter.layout())?;
        Ok(self.classifier.predict_probability(vector.as_slice()))
    }
}

/// Status snapshot of the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelStatus {
    pub model_loaded: bool,
    #[serde(flatten)]
    pub metadata: Option<ModelMetadata>,
}

#[derive(Debug, Default)]
pub struct ModelRegistry {
    current: RwLock<Option<Arc<LoadedModel>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `model` current, returning the shared handle
    pub fn install(&self, model: LoadedModel) -> Arc<LoadedModel> {
        let model = Arc::new(model);
        let previous = self.current.write().replace(Arc::clone(&model));
        if let Some(previous) = previous {
            log::info!(
                "Swapped model '{}' -> '{}'",
                previous.metadata.name,
                model.metadata.name
            );
        }
        model
    }

    /// Build a new model from disk and swap it in.
    ///
    /// On failure the current model keeps serving.
    pub fn reload(
        &self,
        path: &Path,
        expected_sha256: Option<&str>,
        tolerance: f64,
    ) -> InsightResult<Arc<LoadedModel>> {
        match LoadedModel::load(path, expected_sha256, tolerance) {
            Ok(model) => Ok(self.install(model)),
            Err(e) => {
                log::error!("Reload from {} failed: {}", path.display(), e);
                Err(e)
            }
        }
    }

    pub fn current(&self) -> InsightResult<Arc<LoadedModel>> {
        self.current.read().clone().ok_or(InsightError::NoModelLoaded)
    }

    pub fn status(&self) -> ModelStatus {
        let metadata = self.current.read().as_ref().map(|m| m.metadata.clone());
        ModelStatus {
            model_loaded: metadata.is_some(),
            metadata,
        }
    }
}
