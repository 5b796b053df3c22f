//! Logic Module - Scoring & Explanation Engines
//!
//! ## Architecture
//! - `features/` - Raw lead → ordered model feature vector
//! - `model/` - Tree ensemble, artifact bundle, model registry
//! - `attribution/` - TreeSHAP attributions for one instance
//! - `explain/` - Probability deltas, ranking and narratives
//! - `dataset/` - CSV batch scoring and IQR fitting

pub mod features;
pub mod model;
pub mod attribution;
pub mod explain;
pub mod dataset;
