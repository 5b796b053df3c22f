//! One-Hot Encoder - Fitted category vocabulary per field
//!
//! Column names follow `{field}_{category}`. A value resolves to at most
//! one dummy; unresolved values leave every dummy of the field at 0 so the
//! field acts as a neutral reference.

use serde::{Deserialize, Serialize};

use super::layout::{normalize_category, UNKNOWN_CATEGORY};

/// Fitted categories for one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    pub field: String,
    pub values: Vec<String>,
}

impl CategoryVocabulary {
    pub fn new(field: &str, values: &[&str]) -> Self {
        Self {
            field: field.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Expanded column names in vocabulary order
    pub fn column_names(&self) -> impl Iterator<Item = String> + '_ {
        self.values.iter().map(move |v| format!("{}_{}", self.field, v))
    }

    fn has_unknown_bucket(&self) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case(UNKNOWN_CATEGORY))
    }

    /// Index of the dummy a raw category activates.
    ///
    /// - "unknown" (any case) → the explicit unknown bucket, if fitted
    /// - otherwise → the matching category after normalisation
    /// - no match → `None` (all dummies 0)
    pub fn resolve(&self, raw: &str) -> Option<usize> {
        let wanted = normalize_category(raw);
        if wanted == UNKNOWN_CATEGORY && !self.has_unknown_bucket() {
            return None;
        }
        self.values.iter().position(|v| normalize_category(v) == wanted)
    }
}
