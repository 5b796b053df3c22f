//! Integration Tests for the Attribution Engine
//!
//! TreeSHAP is checked against brute-force Shapley values of the
//! cover-conditional expectation, then the engine's shape handling and
//! local-accuracy guard are exercised with stub backends.

#[cfg(test)]
mod integration_tests {
    use std::sync::Arc;

    use ndarray::{array, Array2, ArrayView2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::error::{InsightError, InsightResult};
    use crate::logic::attribution::{
        AttributionBackend, AttributionEngine, ClassValues, ShapOutput, TreeShapExplainer,
    };
    use crate::logic::features::{FeatureLayout, FeatureVector};
    use crate::logic::model::{fixtures, Aggregation, DecisionTree, TreeEnsemble, TreeNode};

    fn layout(n: usize) -> FeatureLayout {
        FeatureLayout::new((0..n).map(|i| format!("f{}", i)).collect())
    }

    fn random_tree(
        rng: &mut StdRng,
        n_features: usize,
        max_depth: usize,
        output: usize,
    ) -> DecisionTree {
        fn build(
            rng: &mut StdRng,
            nodes: &mut Vec<TreeNode>,
            n_features: usize,
            depth: usize,
            cover: f64,
        ) -> usize {
            let index = nodes.len();
            if depth == 0 || rng.gen_bool(0.15) {
                nodes.push(TreeNode::Leaf { value: rng.gen_range(-1.0..1.0), cover });
                return index;
            }
            nodes.push(TreeNode::Leaf { value: 0.0, cover });
            let fraction = rng.gen_range(0.1..0.9);
            let feature = rng.gen_range(0..n_features);
            let threshold = rng.gen_range(0.0..1.0);
            let default_left = rng.gen_bool(0.5);
            let left = build(rng, nodes, n_features, depth - 1, cover * fraction);
            let right = build(rng, nodes, n_features, depth - 1, cover * (1.0 - fraction));
            nodes[index] = TreeNode::Split { feature, threshold, left, right, default_left, cover };
            index
        }

        let mut nodes = Vec::new();
        build(rng, &mut nodes, n_features, max_depth, 1000.0);
        DecisionTree { output, nodes }
    }

    /// E[f(x) | x_S] following covers for features outside S
    fn conditional_expectation(tree: &DecisionTree, node: usize, x: &[f64], subset: u32) -> f64 {
        match &tree.nodes[node] {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { feature, threshold, left, right, default_left, .. } => {
                if subset & (1 << feature) != 0 {
                    let left_taken = crate::logic::model::tree::goes_left(
                        x[*feature],
                        *threshold,
                        *default_left,
                    );
                    let next = if left_taken { *left } else { *right };
                    conditional_expectation(tree, next, x, subset)
                } else {
                    let cl = tree.nodes[*left].cover();
                    let cr = tree.nodes[*right].cover();
                    (cl * conditional_expectation(tree, *left, x, subset)
                        + cr * conditional_expectation(tree, *right, x, subset))
                        / (cl + cr)
                }
            }
        }
    }

    fn factorial(n: usize) -> f64 {
        (1..=n).map(|k| k as f64).product()
    }

    fn brute_force_shap(tree: &DecisionTree, x: &[f64], n: usize) -> Vec<f64> {
        let mut phi = vec![0.0; n];
        for (i, value) in phi.iter_mut().enumerate() {
            for subset in 0u32..(1 << n) {
                if subset & (1 << i) != 0 {
                    continue;
                }
                let size = subset.count_ones() as usize;
                let weight = factorial(size) * factorial(n - size - 1) / factorial(n);
                let with = conditional_expectation(tree, 0, x, subset | (1 << i));
                let without = conditional_expectation(tree, 0, x, subset);
                *value += weight * (with - without);
            }
        }
        phi
    }

    /// Test TreeSHAP matches exhaustive Shapley values on random trees
    #[test]
    fn test_tree_shap_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 5;
        for _ in 0..25 {
            let tree = random_tree(&mut rng, n, 5, 0);
            let ensemble = TreeEnsemble {
                trees: vec![tree.clone()],
                base_score: vec![0.0],
                aggregation: Aggregation::Sum,
                n_features: n,
            };
            let explainer = TreeShapExplainer::new(Arc::new(ensemble)).unwrap();
            let x: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..1.0)).collect();

            let fast = explainer.explain_row(&x);
            let slow = brute_force_shap(&tree, &x, n);
            for f in 0..n {
                assert!(
                    (fast[[f, 0]] - slow[f]).abs() < 1e-9,
                    "feature {}: {} vs {}",
                    f,
                    fast[[f, 0]],
                    slow[f]
                );
            }
        }
    }

    /// Test local accuracy holds for random ensembles and both aggregations
    #[test]
    fn test_local_accuracy_random_ensembles() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 6;
        for aggregation in [Aggregation::Sum, Aggregation::Mean] {
            for _ in 0..10 {
                let trees = (0..8).map(|_| random_tree(&mut rng, n, 6, 0)).collect();
                let ensemble = TreeEnsemble {
                    trees,
                    base_score: vec![rng.gen_range(-2.0..2.0)],
                    aggregation,
                    n_features: n,
                };
                let engine =
                    AttributionEngine::from_ensemble(Arc::new(ensemble.clone()), layout(n), 1e-9)
                        .unwrap();
                let mut values: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..1.0)).collect();
                values[0] = f64::NAN;
                let vector = FeatureVector::from_values(engine.layout(), values.clone()).unwrap();

                let attributions = engine.attribute(&vector).unwrap();
                let sum: f64 = attributions.iter().map(|a| a.shap_value).sum();
                assert!((engine.base_value() + sum - ensemble.margins(&values)[0]).abs() < 1e-9);
            }
        }
    }

    /// Test the bank fixture explains exactly and names every column
    #[test]
    fn test_bank_model_attribution() {
        let model = fixtures::loaded_bank_model();
        let engine = model.explainer().unwrap();
        let vector = model.adapter().transform(&fixtures::sample_lead()).unwrap();

        let attributions = engine.attribute(&vector).unwrap();
        assert_eq!(attributions.len(), fixtures::bank_feature_names().len());
        assert_eq!(attributions[0].feature_name, "age");

        let duration = attributions.iter().find(|a| a.feature_name == "duration").unwrap();
        // Short call pushes the score down in the fixture trees
        assert!(duration.shap_value < 0.0);

        // Columns no tree splits on get exactly zero
        let loan = attributions.iter().find(|a| a.feature_name == "loan_yes").unwrap();
        assert_eq!(loan.shap_value, 0.0);
    }

    /// Test two-output ensembles attribute the positive class
    #[test]
    fn test_binary_two_output_ensemble() {
        let mut rng = StdRng::seed_from_u64(3);
        let n = 3;
        let trees = vec![random_tree(&mut rng, n, 3, 0), random_tree(&mut rng, n, 3, 1)];
        let ensemble = TreeEnsemble {
            trees,
            base_score: vec![0.0, 0.5],
            aggregation: Aggregation::Sum,
            n_features: n,
        };
        let explainer = TreeShapExplainer::new(Arc::new(ensemble.clone())).unwrap();
        let batch = array![[0.2, 0.4, 0.9]];
        let output = explainer.shap_values(batch.view()).unwrap();
        assert!(matches!(output, ShapOutput::Tensor3D(_)));

        let engine =
            AttributionEngine::from_ensemble(Arc::new(ensemble.clone()), layout(n), 1e-9).unwrap();
        assert!((engine.base_value() - ensemble.expected_values()[1]).abs() < 1e-12);
        let vector = FeatureVector::from_values(engine.layout(), vec![0.2, 0.4, 0.9]).unwrap();
        assert!(engine.attribute(&vector).is_ok());
    }

    /// Test a vector built for another layout is rejected
    #[test]
    fn test_layout_mismatch() {
        let model = fixtures::loaded_bank_model();
        let engine = model.explainer().unwrap();
        let other = layout(engine.layout().len());
        let vector = FeatureVector::zeros(&other);
        let err = engine.attribute(&vector).unwrap_err();
        assert!(matches!(err, InsightError::LayoutMismatch(_)));
        assert!(err.is_configuration());
    }

    /// Stub backend returning a canned output
    struct CannedBackend {
        output: ShapOutput,
        expected: ClassValues,
        margin: f64,
    }

    impl AttributionBackend for CannedBackend {
        fn expected_value(&self) -> ClassValues {
            self.expected.clone()
        }

        fn margin(&self, _x: &[f64]) -> ClassValues {
            ClassValues::Scalar(self.margin)
        }

        fn shap_values(&self, _batch: ArrayView2<'_, f64>) -> InsightResult<ShapOutput> {
            Ok(self.output.clone())
        }
    }

    fn canned_engine(
        output: ShapOutput,
        expected: ClassValues,
        margin: f64,
    ) -> InsightResult<AttributionEngine> {
        let backend = CannedBackend { output, expected, margin };
        AttributionEngine::with_backend(Box::new(backend), layout(2), 1e-4)
    }

    /// Test per-class list output picks the positive class
    #[test]
    fn test_per_class_list_backend() {
        let output = ShapOutput::PerClassList(vec![array![[-0.3, -0.2]], array![[0.3, 0.2]]]);
        let engine = canned_engine(output, ClassValues::PerClass(vec![1.0, -1.0]), -0.5).unwrap();
        assert_eq!(engine.base_value(), -1.0);

        let vector = FeatureVector::zeros(engine.layout());
        let attributions = engine.attribute(&vector).unwrap();
        assert_eq!(attributions[0].shap_value, 0.3);
        assert_eq!(attributions[1].feature_name, "f1");
    }

    /// Test ambiguous output is a request error, not a crash
    #[test]
    fn test_ambiguous_output_per_request() {
        let three = ShapOutput::PerClassList(vec![Array2::zeros((1, 2)); 3]);
        let engine = canned_engine(three, ClassValues::Scalar(0.0), 0.0).unwrap();
        let err = engine.attribute(&FeatureVector::zeros(engine.layout())).unwrap_err();
        assert!(matches!(err, InsightError::ShapeAmbiguity(_)));
        assert!(!err.is_configuration());

        // An unresolvable expected value disables the engine up front
        let err = canned_engine(
            ShapOutput::Flat2D(Array2::zeros((1, 2))),
            ClassValues::PerClass(vec![0.0; 3]),
            0.0,
        )
        .unwrap_err();
        assert!(err.is_configuration());
    }

    /// Test the local-accuracy guard trips on inconsistent backends
    #[test]
    fn test_local_accuracy_violation() {
        let output = ShapOutput::Flat2D(array![[0.5, 0.5]]);
        let engine = canned_engine(output, ClassValues::Scalar(0.0), 2.0).unwrap();
        let err = engine.attribute(&FeatureVector::zeros(engine.layout())).unwrap_err();
        assert!(matches!(err, InsightError::LocalAccuracy { .. }));
    }
}
