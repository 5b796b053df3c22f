use serde::{Deserialize, Serialize};

use crate::constants::{APP_NAME, APP_VERSION};
use crate::logic::explain::NarrativeConfig;
use crate::logic::features::layout::FEATURE_VERSION;
use crate::logic::features::LayoutInfo;
use crate::logic::model::ModelStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub app_name: String,
    pub app_version: String,
    pub feature_version: u8,

    /// Column layout of the loaded model
    pub layout: Option<LayoutInfo>,
    pub model: ModelStatus,
    pub narrative: NarrativeConfig,
    pub local_accuracy_tolerance: f64,
}

impl EngineStatus {
    pub fn new(
        model: ModelStatus,
        layout: Option<LayoutInfo>,
        narrative: NarrativeConfig,
        local_accuracy_tolerance: f64,
    ) -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            app_version: APP_VERSION.to_string(),
            feature_version: FEATURE_VERSION,
            layout,
            model,
            narrative,
            local_accuracy_tolerance,
        }
    }
}
