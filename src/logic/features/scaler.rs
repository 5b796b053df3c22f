//! Standard Scaler - Fitted `(x - mean) / scale` per numeric column
//!
//! Column names, not positions, tie the parameters to the layout; the
//! scaler may list columns in a different order than the model.

use serde::{Deserialize, Serialize};

use crate::error::{InsightError, InsightResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Check parameter lengths agree
    pub fn validate(&self) -> InsightResult<()> {
        if self.mean.len() != self.columns.len() || self.scale.len() != self.columns.len() {
            return Err(InsightError::InvalidModel(format!(
                "scaler has {} columns but {} means and {} scales",
                self.columns.len(),
                self.mean.len(),
                self.scale.len()
            )));
        }
        Ok(())
    }

    /// `(mean, scale)` for a column, if scaled
    pub fn params(&self, column: &str) -> Option<(f64, f64)> {
        let i = self.columns.iter().position(|c| c == column)?;
        let scale = self.scale[i];
        // Constant columns are fitted with scale 0; treat as identity scale
        let scale = if scale == 0.0 { 1.0 } else { scale };
        Some((self.mean[i], scale))
    }
}

/// Apply fitted parameters to one value
pub fn standardize(value: f64, (mean, scale): (f64, f64)) -> f64 {
    (value - mean) / scale
}
