//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: The model column order is fixed at fit time**
//!
//! ## Rules (NEVER break these):
//! 1. The vector fed to the model follows `FeatureLayout::names` exactly
//! 2. Change order → layout hash changes → vectors built for the old
//!    layout are rejected
//! 3. Lead schema changes → increment FEATURE_VERSION
//!
//! The raw lead schema (16 fields) is static; the expanded column layout
//! comes from the trained artifact and is hashed at load time.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current lead schema version
/// MUST be incremented when the raw schema changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// LEAD SCHEMA (raw fields)
// ============================================================================

/// Numeric lead fields, in the order the model was fit on
pub const NUMERIC_FIELDS: &[&str] = &[
    "age",      // 0: Customer age in years
    "balance",  // 1: Average yearly balance (EUR)
    "day",      // 2: Day of month of last contact
    "duration", // 3: Last contact duration in seconds
    "campaign", // 4: Contacts during this campaign
    "pdays",    // 5: Days since previous campaign contact (-1 = never)
    "previous", // 6: Contacts before this campaign
];

/// Categorical lead fields, one-hot expanded by the adapter
pub const CATEGORICAL_FIELDS: &[&str] = &[
    "job",
    "marital",
    "education",
    "default",
    "housing",
    "loan",
    "contact",
    "month",
    "poutcome",
];

/// Category value meaning "no information"
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// pdays sentinel for "never contacted"
pub const PDAYS_NOT_CONTACTED: i64 = -1;

/// Legacy pdays sentinel still found in older exports
pub const PDAYS_LEGACY_NOT_CONTACTED: i64 = 999;

/// Whether a field (or expanded column) name is one of the numeric fields
pub fn is_numeric_field(name: &str) -> bool {
    NUMERIC_FIELDS.iter().any(|f| f.eq_ignore_ascii_case(name))
}

/// Split a one-hot column name into `(field, category)`.
///
/// Matches against the known categorical fields so categories that
/// themselves contain `_` stay intact.
pub fn split_dummy(column: &str) -> Option<(&'static str, &str)> {
    let lower = column.to_ascii_lowercase();
    CATEGORICAL_FIELDS.iter().find_map(|field| {
        let prefix_len = field.len() + 1;
        if lower.len() > prefix_len
            && lower.starts_with(field)
            && lower.as_bytes()[field.len()] == b'_'
        {
            Some((*field, &column[prefix_len..]))
        } else {
            None
        }
    })
}

/// Normalise a category for comparison: lower-case, no '.', '-' or spaces.
///
/// "admin." == "Admin", "blue-collar" == "Blue Collar"
pub fn normalize_category(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

// ============================================================================
// FEATURE LAYOUT (expanded columns)
// ============================================================================

/// Ordered model input columns plus their CRC32 hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureLayout {
    names: Vec<String>,
    hash: u32,
}

impl FeatureLayout {
    pub fn new(names: Vec<String>) -> Self {
        let hash = compute_layout_hash(&names);
        Self { names, hash }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Get feature index by name (O(n), layouts are small)
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Get feature name by index
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Validate that a vector was built for this layout
    pub fn validate(&self, hash: u32, len: usize) -> Result<(), LayoutMismatchError> {
        if hash != self.hash || len != self.names.len() {
            return Err(LayoutMismatchError {
                expected_hash: self.hash,
                expected_len: self.names.len(),
                actual_hash: hash,
                actual_len: len,
            });
        }
        Ok(())
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            version: FEATURE_VERSION,
            hash: self.hash,
            feature_count: self.names.len(),
            feature_names: self.names.clone(),
        }
    }
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// Compute CRC32 hash of an ordered column list
/// Used to detect layout mismatches at runtime
pub fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();

    // Include version in hash
    hasher.update(&[FEATURE_VERSION]);

    // Hash all feature names in order
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a feature vector doesn't match the loaded layout
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Feature layout mismatch: expected {expected_len} columns (hash: {expected_hash:08x}), \
     got {actual_len} columns (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_hash: u32,
    pub expected_len: usize,
    pub actual_hash: u32,
    pub actual_len: usize,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> FeatureLayout {
        FeatureLayout::new(vec![
            "age".to_string(),
            "balance".to_string(),
            "job_admin.".to_string(),
            "job_blue-collar".to_string(),
        ])
    }

    #[test]
    fn test_schema_sizes() {
        assert_eq!(NUMERIC_FIELDS.len(), 7);
        assert_eq!(CATEGORICAL_FIELDS.len(), 9);
    }

    #[test]
    fn test_layout_hash_consistency() {
        let names = layout().names().to_vec();
        assert_eq!(compute_layout_hash(&names), compute_layout_hash(&names));
        assert_ne!(compute_layout_hash(&names), 0);
    }

    #[test]
    fn test_layout_hash_order_sensitive() {
        let a = FeatureLayout::new(vec!["age".into(), "balance".into()]);
        let b = FeatureLayout::new(vec!["balance".into(), "age".into()]);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_validate_layout() {
        let layout = layout();
        assert!(layout.validate(layout.hash(), 4).is_ok());
        assert!(layout.validate(layout.hash(), 3).is_err());
        assert!(layout.validate(layout.hash().wrapping_add(1), 4).is_err());
    }

    #[test]
    fn test_feature_index() {
        let layout = layout();
        assert_eq!(layout.index_of("age"), Some(0));
        assert_eq!(layout.index_of("job_blue-collar"), Some(3));
        assert_eq!(layout.index_of("nonexistent"), None);
        assert_eq!(layout.name(1), Some("balance"));
        assert_eq!(layout.name(100), None);
    }

    #[test]
    fn test_split_dummy() {
        assert_eq!(split_dummy("job_admin."), Some(("job", "admin.")));
        assert_eq!(split_dummy("job_self-employed"), Some(("job", "self-employed")));
        assert_eq!(split_dummy("poutcome_unknown"), Some(("poutcome", "unknown")));
        assert_eq!(split_dummy("age"), None);
        assert_eq!(split_dummy("job_"), None);
        assert_eq!(split_dummy("jobless_x"), None);
    }

    #[test]
    fn test_normalize_category() {
        assert_eq!(normalize_category("Admin."), "admin");
        assert_eq!(normalize_category("blue-collar"), "bluecollar");
        assert_eq!(normalize_category(" Blue Collar "), "bluecollar");
    }

    #[test]
    fn test_layout_info() {
        let info = layout().info();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, 4);
        assert_eq!(info.feature_names.len(), 4);
    }
}
