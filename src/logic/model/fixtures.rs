//! Test fixtures - A small hand-built model over the full bank schema

use std::collections::BTreeMap;

use crate::logic::features::{CategoryVocabulary, IqrBounds, RawInstance, NUMERIC_FIELDS};
use super::artifact::{ArtifactBundle, ModelArtifact, PipelineStep};
use super::registry::LoadedModel;
use super::tree::{Aggregation, DecisionTree, TreeEnsemble, TreeNode};

pub fn bank_vocabulary() -> Vec<CategoryVocabulary> {
    vec![
        CategoryVocabulary::new(
            "job",
            &[
                "admin.", "blue-collar", "entrepreneur", "housemaid", "management", "retired",
                "self-employed", "services", "student", "technician", "unemployed", "unknown",
            ],
        ),
        CategoryVocabulary::new("marital", &["divorced", "married", "single"]),
        CategoryVocabulary::new("education", &["primary", "secondary", "tertiary", "unknown"]),
        CategoryVocabulary::new("default", &["no", "yes"]),
        CategoryVocabulary::new("housing", &["no", "yes"]),
        CategoryVocabulary::new("loan", &["no", "yes"]),
        CategoryVocabulary::new("contact", &["cellular", "telephone", "unknown"]),
        CategoryVocabulary::new(
            "month",
            &["apr", "aug", "dec", "feb", "jan", "jul", "jun", "mar", "may", "nov", "oct", "sep"],
        ),
        CategoryVocabulary::new("poutcome", &["failure", "other", "success", "unknown"]),
    ]
}

/// Numerics first, then every dummy in vocabulary order
pub fn bank_feature_names() -> Vec<String> {
    let mut names: Vec<String> = NUMERIC_FIELDS.iter().map(|s| s.to_string()).collect();
    for vocab in bank_vocabulary() {
        names.extend(vocab.column_names());
    }
    names
}

fn split(
    names: &[String],
    feature: &str,
    threshold: f64,
    left: usize,
    right: usize,
    cover: f64,
) -> TreeNode {
    let feature = names
        .iter()
        .position(|n| n == feature)
        .unwrap_or_else(|| panic!("fixture column {} missing", feature));
    TreeNode::Split { feature, threshold, left, right, default_left: true, cover }
}

fn leaf(value: f64, cover: f64) -> TreeNode {
    TreeNode::Leaf { value, cover }
}

pub fn bank_ensemble() -> TreeEnsemble {
    let n = bank_feature_names();
    let tree = |nodes| DecisionTree { output: 0, nodes };
    TreeEnsemble {
        trees: vec![
            tree(vec![
                split(&n, "duration", 300.0, 1, 4, 1000.0),
                split(&n, "poutcome_success", 0.5, 2, 3, 700.0),
                leaf(-1.2, 650.0),
                leaf(0.9, 50.0),
                split(&n, "housing_yes", 0.5, 5, 6, 300.0),
                leaf(1.1, 160.0),
                leaf(0.2, 140.0),
            ]),
            tree(vec![
                split(&n, "age", 60.0, 1, 2, 1000.0),
                split(&n, "contact_unknown", 0.5, 3, 4, 900.0),
                leaf(0.6, 100.0),
                leaf(0.1, 650.0),
                leaf(-0.5, 250.0),
            ]),
            tree(vec![
                split(&n, "pdays", -0.5, 1, 2, 1000.0),
                split(&n, "month_may", 0.5, 3, 4, 820.0),
                leaf(0.4, 180.0),
                leaf(0.05, 550.0),
                leaf(-0.3, 270.0),
            ]),
            // duration split twice on one path
            tree(vec![
                split(&n, "duration", 600.0, 1, 4, 1000.0),
                split(&n, "duration", 120.0, 2, 3, 850.0),
                leaf(-0.4, 300.0),
                leaf(0.0, 550.0),
                split(&n, "balance", 1000.0, 5, 6, 150.0),
                leaf(0.3, 90.0),
                leaf(0.5, 60.0),
            ]),
            tree(vec![
                split(&n, "job_retired", 0.5, 1, 2, 1000.0),
                split(&n, "education_tertiary", 0.5, 3, 4, 950.0),
                leaf(0.15, 50.0),
                leaf(-0.05, 700.0),
                leaf(0.08, 250.0),
            ]),
        ],
        base_score: vec![-1.0],
        aggregation: Aggregation::Sum,
        n_features: n.len(),
    }
}

pub fn bank_iqr_bounds() -> BTreeMap<String, IqrBounds> {
    let mut bounds = BTreeMap::new();
    bounds.insert("age".to_string(), IqrBounds::new(10.5, 70.5));
    bounds.insert("balance".to_string(), IqrBounds::new(-1962.0, 3462.0));
    bounds.insert("day".to_string(), IqrBounds::new(-11.5, 40.5));
    bounds.insert("duration".to_string(), IqrBounds::new(-221.0, 643.0));
    bounds.insert("campaign".to_string(), IqrBounds::new(-2.0, 6.0));
    bounds
}

/// Toy bundle with the estimator wrapped in a resampling pipeline
pub fn bank_bundle() -> ArtifactBundle {
    ArtifactBundle {
        name: "bank-toy".to_string(),
        version: Some("1".to_string()),
        feature_names: bank_feature_names(),
        numeric_fields: NUMERIC_FIELDS.iter().map(|s| s.to_string()).collect(),
        categories: bank_vocabulary(),
        iqr_bounds: bank_iqr_bounds(),
        scaler: None,
        model: ModelArtifact::Pipeline {
            steps: vec![
                PipelineStep::Resample { name: "smote".to_string() },
                PipelineStep::Estimator {
                    model: Box::new(ModelArtifact::TreeEnsemble(bank_ensemble())),
                },
            ],
        },
    }
}

pub fn loaded_bank_model() -> LoadedModel {
    LoadedModel::from_bundle(bank_bundle(), "memory", String::new(), 1e-4)
        .expect("fixture bundle must load")
}

/// Reference lead used across the end-to-end tests
pub fn sample_lead() -> RawInstance {
    RawInstance::new()
        .with("age", 45i64)
        .with("balance", 1500i64)
        .with("duration", 125i64)
        .with("campaign", 2i64)
        .with("pdays", -1i64)
        .with("previous", 0i64)
        .with("day", 15i64)
        .with("job", "retired")
        .with("marital", "married")
        .with("education", "tertiary")
        .with("default", "no")
        .with("housing", "no")
        .with("loan", "no")
        .with("contact", "cellular")
        .with("month", "may")
        .with("poutcome", "unknown")
}
