//! Features Module - Preprocessing Adapter
//!
//! Maps raw lead fields into the exact ordered feature vector the model
//! was fit on. Clipping, scaling and one-hot vocabularies are fitted
//! inputs; this module only applies them.

pub mod layout;
pub mod vector;
pub mod raw;
pub mod clipping;
pub mod scaler;
pub mod encoder;
pub mod adapter;


// Re-export common types
pub use adapter::{PreparedInstance, PreprocessingAdapter};
pub use clipping::IqrBounds;
pub use encoder::CategoryVocabulary;
pub use layout::{FeatureLayout, LayoutInfo, CATEGORICAL_FIELDS, NUMERIC_FIELDS};
pub use raw::{RawInstance, RawValue};
pub use scaler::StandardScaler;
pub use vector::FeatureVector;
