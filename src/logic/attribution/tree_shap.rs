//! TreeSHAP - Exact path-dependent Shapley values for tree ensembles
//!
//! Polynomial-time algorithm of Lundberg et al. (Algorithm 2). Each root→leaf
//! walk keeps the set of unique features on the path with the fraction of
//! "zero" (feature absent, follow covers) and "one" (feature present, follow
//! `x`) paths flowing through them, plus the permutation weights.
//!
//! Attributions sum exactly to `margin(x) - expected_value` per output.

use std::sync::Arc;

use ndarray::{s, Array2, Array3, ArrayView2, Axis};

use crate::error::{InsightError, InsightResult};
use crate::logic::model::tree::{goes_left, DecisionTree, TreeEnsemble, TreeNode};
use super::engine::AttributionBackend;
use super::shape::{ClassValues, ShapOutput};

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

fn extend_path(
    path: &mut Vec<PathElement>,
    zero_fraction: f64,
    one_fraction: f64,
    feature: Option<usize>,
) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if depth == 0 { 1.0 } else { 0.0 },
    });
    let denom = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].pweight += one_fraction * path[i].pweight * (i + 1) as f64 / denom;
        path[i].pweight = zero_fraction * path[i].pweight * (depth - i) as f64 / denom;
    }
}

/// Undo the extension that introduced `path[index]`
fn unwind_path(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let PathElement { zero_fraction, one_fraction, .. } = path[index];
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].pweight;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let previous = path[i].pweight;
            path[i].pweight = next_one_portion * denom / ((i + 1) as f64 * one_fraction);
            next_one_portion =
                previous - path[i].pweight * zero_fraction * (depth - i) as f64 / denom;
        } else {
            path[i].pweight = path[i].pweight * denom / (zero_fraction * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
    path.pop();
}

/// Total permutation weight of the path with `path[index]` unwound
fn unwound_path_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let PathElement { zero_fraction, one_fraction, .. } = path[index];
    let denom = (depth + 1) as f64;
    let mut next_one_portion = path[depth].pweight;
    let mut total = 0.0;

    for i in (0..depth).rev() {
        if one_fraction != 0.0 {
            let portion = next_one_portion * denom / ((i + 1) as f64 * one_fraction);
            total += portion;
            next_one_portion =
                path[i].pweight - portion * zero_fraction * (depth - i) as f64 / denom;
        } else if zero_fraction != 0.0 {
            total += path[i].pweight * denom / (zero_fraction * (depth - i) as f64);
        }
    }
    total
}

/// Per-row traversal state
struct Walk<'a> {
    tree: &'a DecisionTree,
    x: &'a [f64],
    phi: &'a mut [f64],
    scale: f64,
}

impl Walk<'_> {
    fn recurse(
        &mut self,
        node: usize,
        mut path: Vec<PathElement>,
        zero_fraction: f64,
        one_fraction: f64,
        feature: Option<usize>,
    ) {
        extend_path(&mut path, zero_fraction, one_fraction, feature);

        let tree = self.tree;
        match &tree.nodes[node] {
            TreeNode::Leaf { value, .. } => {
                for i in 1..path.len() {
                    let weight = unwound_path_sum(&path, i);
                    let element = path[i];
                    if let Some(f) = element.feature {
                        self.phi[f] += weight
                            * (element.one_fraction - element.zero_fraction)
                            * value
                            * self.scale;
                    }
                }
            }
            TreeNode::Split { feature: split, threshold, left, right, default_left, .. } => {
                let (hot, cold) = if goes_left(self.x[*split], *threshold, *default_left) {
                    (*left, *right)
                } else {
                    (*right, *left)
                };
                let hot_cover = tree.nodes[hot].cover();
                let cold_cover = tree.nodes[cold].cover();
                let total = hot_cover + cold_cover;

                // A feature seen higher up the path is re-split here
                let mut incoming_zero = 1.0;
                let mut incoming_one = 1.0;
                if let Some(k) = path.iter().position(|e| e.feature == Some(*split)) {
                    incoming_zero = path[k].zero_fraction;
                    incoming_one = path[k].one_fraction;
                    unwind_path(&mut path, k);
                }

                self.recurse(
                    hot,
                    path.clone(),
                    incoming_zero * hot_cover / total,
                    incoming_one,
                    Some(*split),
                );
                self.recurse(cold, path, incoming_zero * cold_cover / total, 0.0, Some(*split));
            }
        }
    }
}

/// Add one tree's attributions for `x` into `phi`
fn tree_shap(tree: &DecisionTree, x: &[f64], phi: &mut [f64], scale: f64) {
    let capacity = tree.max_depth() + 2;
    let mut walk = Walk { tree, x, phi, scale };
    walk.recurse(0, Vec::with_capacity(capacity), 1.0, 1.0, None);
}

/// TreeSHAP over a shared tree ensemble
#[derive(Debug, Clone)]
pub struct TreeShapExplainer {
    ensemble: Arc<TreeEnsemble>,
    weights: Vec<f64>,
    expected: Vec<f64>,
}

impl TreeShapExplainer {
    pub fn new(ensemble: Arc<TreeEnsemble>) -> InsightResult<Self> {
        ensemble.validate()?;
        let weights = ensemble.tree_weights();
        let expected = ensemble.expected_values();
        log::debug!(
            "TreeSHAP explainer: {} trees, max depth {}, expected value {:?}",
            ensemble.trees.len(),
            ensemble.max_depth(),
            expected
        );
        Ok(Self { ensemble, weights, expected })
    }

    /// Attributions `(features, outputs)` for one row
    pub fn explain_row(&self, x: &[f64]) -> Array2<f64> {
        let n_features = self.ensemble.n_features;
        let mut phi = vec![vec![0.0; n_features]; self.ensemble.n_outputs()];
        for (tree, scale) in self.ensemble.trees.iter().zip(&self.weights) {
            tree_shap(tree, x, &mut phi[tree.output], *scale);
        }
        Array2::from_shape_fn((n_features, phi.len()), |(f, o)| phi[o][f])
    }
}

impl AttributionBackend for TreeShapExplainer {
    fn expected_value(&self) -> ClassValues {
        ClassValues::from(self.expected.clone())
    }

    fn margin(&self, x: &[f64]) -> ClassValues {
        ClassValues::from(self.ensemble.margins(x))
    }

    fn shap_values(&self, batch: ArrayView2<'_, f64>) -> InsightResult<ShapOutput> {
        let (samples, width) = batch.dim();
        let n_features = self.ensemble.n_features;
        if width != n_features {
            return Err(InsightError::MalformedInput(format!(
                "batch has {} columns, model expects {}",
                width, n_features
            )));
        }

        let n_outputs = self.ensemble.n_outputs();
        let mut out = Array3::<f64>::zeros((samples, n_features, n_outputs));
        for (i, row) in batch.rows().into_iter().enumerate() {
            let x = row.to_vec();
            let phi = self.explain_row(&x);
            out.slice_mut(s![i, .., ..]).assign(&phi);
        }

        if n_outputs == 1 {
            Ok(ShapOutput::Flat2D(out.index_axis_move(Axis(2), 0)))
        } else {
            Ok(ShapOutput::Tensor3D(out))
        }
    }
}
