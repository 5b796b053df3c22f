//! Probability-Delta Converter - Log-odds contribution → percentage points
//!
//! `delta = (σ(base + shap) − σ(base)) · 100`
//!
//! Shapley values add up in log-odds space only. Each delta is taken from
//! the base probability in isolation, so the deltas of one explanation do
//! NOT sum to `predicted − base` probability. This is shown to users as-is;
//! rescaling them to force the sum would misstate what the model does.

pub use crate::logic::model::sigmoid;

/// Percentage-point change from moving `shap_value` away from the base log-odds
pub fn to_probability_delta(shap_value: f64, base_value: f64) -> f64 {
    (sigmoid(base_value + shap_value) - sigmoid(base_value)) * 100.0
}

/// Base probability in percent
pub fn base_probability_pct(base_value: f64) -> f64 {
    sigmoid(base_value) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_sign_and_zero() {
        assert_eq!(to_probability_delta(0.0, -1.3), 0.0);
        assert!(to_probability_delta(0.5, -1.3) > 0.0);
        assert!(to_probability_delta(-0.5, -1.3) < 0.0);
    }

    #[test]
    fn test_delta_value() {
        // σ(0) = 0.5, σ(ln 3) = 0.75
        let delta = to_probability_delta(3f64.ln(), 0.0);
        assert!((delta - 25.0).abs() < 1e-9);
        assert_eq!(base_probability_pct(0.0), 50.0);
    }

    #[test]
    fn test_deltas_are_not_additive() {
        let base = -1.0;
        let shaps = [1.2, 0.8, -0.4];
        let delta_sum: f64 = shaps.iter().map(|s| to_probability_delta(*s, base)).sum();
        let exact = (sigmoid(base + shaps.iter().sum::<f64>()) - sigmoid(base)) * 100.0;
        assert!((delta_sum - exact).abs() > 1.0);
    }

    #[test]
    fn test_extreme_base_is_finite() {
        assert!(to_probability_delta(5.0, -800.0).is_finite());
        assert!(to_probability_delta(-5.0, 800.0).is_finite());
    }
}
