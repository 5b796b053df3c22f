//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! Environment variables override these at startup.

use crate::logic::attribution::DEFAULT_LOCAL_ACCURACY_TOLERANCE;
use crate::logic::explain::{DEFAULT_NEGLIGIBLE_PCT, DEFAULT_TOP_N};

/// Default path of the trained artifact bundle
pub const DEFAULT_MODEL_PATH: &str = "models/lead_model.json";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Lead Insight";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get artifact path from environment or use default
pub fn get_model_path() -> String {
    std::env::var("LEAD_MODEL_PATH")
        .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Expected artifact SHA-256, if pinned
pub fn get_model_sha256() -> Option<String> {
    std::env::var("LEAD_MODEL_SHA256")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Get number of detailed explanations from environment or use default
pub fn get_top_n() -> usize {
    std::env::var("LEAD_TOP_N")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_TOP_N)
}

/// Get negligible-impact threshold (percentage points) from environment or use default
pub fn get_negligible_pct() -> f64 {
    std::env::var("LEAD_NEGLIGIBLE_PCT")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v: &f64| v.is_finite() && *v >= 0.0)
        .unwrap_or(DEFAULT_NEGLIGIBLE_PCT)
}

/// Get local-accuracy tolerance from environment or use default
pub fn get_local_accuracy_tolerance() -> f64 {
    std::env::var("LEAD_LOCAL_ACCURACY_TOLERANCE")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|v: &f64| v.is_finite() && *v > 0.0)
        .unwrap_or(DEFAULT_LOCAL_ACCURACY_TOLERANCE)
}
