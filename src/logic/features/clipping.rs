//! IQR Clipping - Outlier suppression for numeric fields
//!
//! Bounds are computed once offline per numeric column:
//! `lower = Q1 - 1.5·IQR`, `upper = Q3 + 1.5·IQR`.
//! Clipping at inference time is silent.

use serde::{Deserialize, Serialize};

/// IQR multiplier for the whisker bounds
pub const IQR_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IqrBounds {
    pub lower: f64,
    pub upper: f64,
}

impl IqrBounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Bounds from the first and third quartile
    pub fn from_quartiles(q1: f64, q3: f64) -> Self {
        let iqr = q3 - q1;
        Self {
            lower: q1 - IQR_MULTIPLIER * iqr,
            upper: q3 + IQR_MULTIPLIER * iqr,
        }
    }

    /// Fit bounds from a column sample. Non-finite values are ignored.
    ///
    /// Returns `None` for an empty column.
    pub fn fit(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        Some(Self::from_quartiles(quantile(&sorted, 0.25), quantile(&sorted, 0.75)))
    }

    pub fn clip(&self, value: f64) -> f64 {
        value.max(self.lower).min(self.upper)
    }
}

/// Linear-interpolated quantile of an ascending slice
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_quartiles() {
        let bounds = IqrBounds::from_quartiles(10.0, 20.0);
        assert_eq!(bounds.lower, -5.0);
        assert_eq!(bounds.upper, 35.0);
    }

    #[test]
    fn test_fit_linear_interpolation() {
        // Q1 = 1.75, Q3 = 3.25 with linear interpolation over 1..=4
        let bounds = IqrBounds::fit(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert!((bounds.lower - (1.75 - 2.25)).abs() < 1e-12);
        assert!((bounds.upper - (3.25 + 2.25)).abs() < 1e-12);
    }

    #[test]
    fn test_fit_ignores_non_finite() {
        let bounds = IqrBounds::fit(&[f64::NAN, 5.0, 5.0]).unwrap();
        assert_eq!(bounds, IqrBounds::new(5.0, 5.0));
        assert!(IqrBounds::fit(&[]).is_none());
    }

    #[test]
    fn test_clip_is_silent() {
        let bounds = IqrBounds::new(-5.0, 35.0);
        assert_eq!(bounds.clip(100.0), 35.0);
        assert_eq!(bounds.clip(-100.0), -5.0);
        assert_eq!(bounds.clip(12.0), 12.0);
    }
}
