//! Explain Module - Shapley values → ranked human narrative
//!
//! Converts log-odds attributions into percentage-point impacts, keeps
//! the columns that describe the lead, ranks them and renders sentences.

pub mod types;
pub mod probability;
pub mod labels;
pub mod format;
pub mod engine;


// Re-export common types
pub use engine::{NarrativeBuilder, NarrativeConfig, DEFAULT_NEGLIGIBLE_PCT, DEFAULT_TOP_N};
pub use probability::{base_probability_pct, to_probability_delta};
pub use types::{Attribution, Direction, ExplanationResult, ImpactSummary, TopExplanation};
