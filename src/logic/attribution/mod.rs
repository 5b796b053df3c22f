//! Attribution Module - Shapley values for the loaded tree model
//!
//! The engine hides the explainer's output shape: callers get one
//! positive-class value per model column, checked for local accuracy.

pub mod shape;
pub mod tree_shap;
pub mod engine;

#[cfg(test)]
mod tests;

// Re-export common types
pub use engine::{
    AttributionBackend, AttributionEngine, FeatureAttribution, DEFAULT_LOCAL_ACCURACY_TOLERANCE,
};
pub use shape::{ClassValues, ShapOutput};
pub use tree_shap::TreeShapExplainer;
