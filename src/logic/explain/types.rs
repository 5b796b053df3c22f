use serde::{Deserialize, Serialize};

/// Sign of an attribution in probability space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    /// Zero counts as negative
    pub fn from_impact(impact_pct: f64) -> Self {
        if impact_pct > 0.0 {
            Direction::Positive
        } else {
            Direction::Negative
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub feature_name: String,
    pub shap_value: f64,   // log-odds
    pub impact_pct: f64,   // percentage points
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopExplanation {
    pub feature: String,
    pub feature_value: String,
    pub narrative: String,
    pub impact_pct: f64,
    pub direction: Direction,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactSummary {
    pub feature: String,
    pub feature_value: String,
    pub impact_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationResult {
    pub base_value: f64,
    pub base_prob_pct: f64,
    pub top_explanations: Vec<TopExplanation>,
    pub all_impacts: Vec<ImpactSummary>,
    /// Active attributions in rank order
    #[serde(skip)]
    pub ranked: Vec<Attribution>,
}
