//! Lead Insight - Lead scoring with per-feature explanations
//!
//! Scores bank-marketing leads with a tree-ensemble classifier and explains
//! each score with TreeSHAP attributions rendered as ranked, human-readable
//! narratives.

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod logic;

pub use api::{LeadService, EngineStatus};
pub use config::Config;
pub use error::{ErrorKind, InsightError, InsightResult};
