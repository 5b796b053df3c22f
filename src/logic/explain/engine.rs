use serde::{Deserialize, Serialize};

use crate::logic::attribution::FeatureAttribution;
use crate::logic::features::layout::{is_numeric_field, normalize_category, split_dummy};
use crate::logic::features::RawInstance;
use super::format::{narrative, DisplayValue};
use super::labels::{label_for, lookup};
use super::probability::{base_probability_pct, to_probability_delta};
use super::types::{Attribution, Direction, ExplanationResult, ImpactSummary, TopExplanation};

/// Default number of detailed explanations
pub const DEFAULT_TOP_N: usize = 5;

/// Default negligible-impact threshold (percentage points)
pub const DEFAULT_NEGLIGIBLE_PCT: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeConfig {
    pub top_n: usize,
    /// Impacts with `|impact| <= threshold` are left out of the top list
    pub negligible_threshold: f64,
    /// Also apply the threshold to `all_impacts`
    pub prune_all_impacts: bool,
    pub all_impacts_limit: Option<usize>,
}

impl Default for NarrativeConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            negligible_threshold: DEFAULT_NEGLIGIBLE_PCT,
            prune_all_impacts: false,
            all_impacts_limit: None,
        }
    }
}

/// Whether a model column describes this lead.
///
/// Numeric columns always do; a dummy only when its category is the
/// lead's category for that field.
pub fn is_active(column: &str, raw: &RawInstance) -> bool {
    if is_numeric_field(column) {
        return true;
    }
    match split_dummy(column) {
        Some((field, suffix)) => raw
            .category(field)
            .map(|value| normalize_category(suffix) == normalize_category(&value))
            .unwrap_or(false),
        None => false,
    }
}

#[derive(Debug, Clone, Default)]
pub struct NarrativeBuilder {
    config: NarrativeConfig,
}

impl NarrativeBuilder {
    pub fn new(config: NarrativeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NarrativeConfig {
        &self.config
    }

    fn is_significant(&self, impact_pct: f64) -> bool {
        impact_pct.abs() > self.config.negligible_threshold
    }

    /// Convert engine output and build the explanation
    pub fn build(
        &self,
        attributions: &[FeatureAttribution],
        raw: &RawInstance,
        base_value: f64,
    ) -> ExplanationResult {
        let converted = attributions
            .iter()
            .map(|a| Attribution {
                feature_name: a.feature_name.clone(),
                shap_value: a.shap_value,
                impact_pct: to_probability_delta(a.shap_value, base_value),
            })
            .collect();
        self.build_from_impacts(converted, raw, base_value)
    }

    /// Filter, rank and render attributions that already carry `impact_pct`
    pub fn build_from_impacts(
        &self,
        attributions: Vec<Attribution>,
        raw: &RawInstance,
        base_value: f64,
    ) -> ExplanationResult {
        let total = attributions.len();
        let mut ranked: Vec<Attribution> = attributions
            .into_iter()
            .filter(|a| is_active(&a.feature_name, raw))
            .collect();
        // Stable: ties keep model column order
        ranked.sort_by(|a, b| b.impact_pct.abs().total_cmp(&a.impact_pct.abs()));

        let top_explanations: Vec<TopExplanation> = ranked
            .iter()
            .filter(|a| self.is_significant(a.impact_pct))
            .take(self.config.top_n)
            .map(|a| self.render(a, raw))
            .collect();

        let mut all_impacts: Vec<ImpactSummary> = ranked
            .iter()
            .filter(|a| !self.config.prune_all_impacts || self.is_significant(a.impact_pct))
            .map(|a| ImpactSummary {
                feature: label_for(&a.feature_name),
                feature_value: DisplayValue::resolve(&a.feature_name, raw).feature_value,
                impact_pct: a.impact_pct,
            })
            .collect();
        if let Some(limit) = self.config.all_impacts_limit {
            all_impacts.truncate(limit);
        }

        log::debug!(
            "Explanation: {} attributions, {} active, {} in top list",
            total,
            ranked.len(),
            top_explanations.len()
        );

        ExplanationResult {
            base_value,
            base_prob_pct: base_probability_pct(base_value),
            top_explanations,
            all_impacts,
            ranked,
        }
    }

    fn render(&self, attribution: &Attribution, raw: &RawInstance) -> TopExplanation {
        let direction = Direction::from_impact(attribution.impact_pct);
        let column = &attribution.feature_name;
        let (label, context) = match lookup(column) {
            Some(entry) => (entry.label.to_string(), entry.context(direction).to_string()),
            None => (label_for(column), String::new()),
        };
        let display = DisplayValue::resolve(column, raw);

        TopExplanation {
            narrative: narrative(column, &display, &label, &context),
            feature: label,
            feature_value: display.feature_value,
            impact_pct: attribution.impact_pct,
            direction,
            context,
        }
    }
}
