//! Configuration module

use std::path::PathBuf;

use crate::constants;
use crate::logic::attribution::DEFAULT_LOCAL_ACCURACY_TOLERANCE;
use crate::logic::explain::NarrativeConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Trained artifact bundle
    pub model_path: PathBuf,

    /// Pinned artifact SHA-256
    pub model_sha256: Option<String>,

    /// Narrative settings
    pub narrative: NarrativeConfig,

    /// Allowed |base + Σshap − margin|
    pub local_accuracy_tolerance: f64,
}

impl Config {
    /// Load configuration from environment variables (and `.env` if present)
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }

        Self {
            model_path: PathBuf::from(constants::get_model_path()),
            model_sha256: constants::get_model_sha256(),
            narrative: NarrativeConfig {
                top_n: constants::get_top_n(),
                negligible_threshold: constants::get_negligible_pct(),
                ..NarrativeConfig::default()
            },
            local_accuracy_tolerance: constants::get_local_accuracy_tolerance(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            model_sha256: None,
            narrative: NarrativeConfig::default(),
            local_accuracy_tolerance: DEFAULT_LOCAL_ACCURACY_TOLERANCE,
        }
    }
}
