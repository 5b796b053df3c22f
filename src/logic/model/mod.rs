//! Model Module - Tree classifier, artifact bundle and registry
//!
//! Evaluation is kept apart from attribution: the same shared ensemble
//! backs both the classifier and the TreeSHAP explainer.

pub mod tree;
pub mod classifier;
pub mod artifact;
pub mod registry;

#[cfg(test)]
pub mod fixtures;

// Re-export common types
pub use artifact::{ArtifactBundle, ModelArtifact, PipelineStep};
pub use classifier::{sigmoid, Classifier, LogisticModel, TreeClassifier};
pub use registry::{LoadedModel, ModelMetadata, ModelRegistry, ModelStatus};
pub use tree::{Aggregation, DecisionTree, TreeEnsemble, TreeNode};
