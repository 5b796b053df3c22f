//! Tree Ensemble - Cover-annotated decision trees
//!
//! Nodes are stored flat; children always follow their parent so a tree is
//! acyclic by construction. `cover` is the training weight reaching a node
//! and drives both the expected value and path-dependent TreeSHAP.
//!
//! Decision rule: `x <= threshold` goes left, NaN follows `default_left`.

use serde::{Deserialize, Serialize};

use crate::error::{InsightError, InsightResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default)]
        default_left: bool,
        cover: f64,
    },
    Leaf {
        value: f64,
        cover: f64,
    },
}

impl TreeNode {
    pub fn cover(&self) -> f64 {
        match self {
            TreeNode::Split { cover, .. } | TreeNode::Leaf { cover, .. } => *cover,
        }
    }
}

/// Which branch a split sends `value` down
pub fn goes_left(value: f64, threshold: f64, default_left: bool) -> bool {
    if value.is_nan() {
        default_left
    } else {
        value <= threshold
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Output (class margin) this tree contributes to
    #[serde(default)]
    pub output: usize,
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn validate(&self, n_features: usize, n_outputs: usize) -> InsightResult<()> {
        if self.nodes.is_empty() {
            return Err(InsightError::InvalidModel("tree has no nodes".into()));
        }
        if self.output >= n_outputs {
            return Err(InsightError::InvalidModel(format!(
                "tree output {} out of range ({} outputs)",
                self.output, n_outputs
            )));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let cover = node.cover();
            if !cover.is_finite() || cover <= 0.0 {
                return Err(InsightError::InvalidModel(format!(
                    "node {} has non-positive cover {}",
                    index, cover
                )));
            }
            match node {
                TreeNode::Split { feature, threshold, left, right, .. } => {
                    if *feature >= n_features {
                        return Err(InsightError::InvalidModel(format!(
                            "node {} splits on feature {} but the model has {} features",
                            index, feature, n_features
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(InsightError::InvalidModel(format!(
                            "node {} has a NaN threshold",
                            index
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(InsightError::InvalidModel(format!(
                                "node {} has invalid child index {}",
                                index, child
                            )));
                        }
                    }
                    if left == right {
                        return Err(InsightError::InvalidModel(format!(
                            "node {} has identical children",
                            index
                        )));
                    }
                }
                TreeNode::Leaf { value, .. } => {
                    if !value.is_finite() {
                        return Err(InsightError::InvalidModel(format!(
                            "leaf {} has non-finite value",
                            index
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf value reached by `x`
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split { feature, threshold, left, right, default_left, .. } => {
                    index = if goes_left(x[*feature], *threshold, *default_left) {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Cover-weighted mean leaf value.
    ///
    /// Child covers (not the parent's recorded cover) weight each branch,
    /// matching the fractions TreeSHAP uses.
    pub fn expected_value(&self) -> f64 {
        self.node_expectation(0)
    }

    fn node_expectation(&self, index: usize) -> f64 {
        match &self.nodes[index] {
            TreeNode::Leaf { value, .. } => *value,
            TreeNode::Split { left, right, .. } => {
                let cover_left = self.nodes[*left].cover();
                let cover_right = self.nodes[*right].cover();
                let total = cover_left + cover_right;
                let weighted = cover_left * self.node_expectation(*left)
                    + cover_right * self.node_expectation(*right);
                weighted / total
            }
        }
    }

    pub fn max_depth(&self) -> usize {
        self.depth_from(0)
    }

    fn depth_from(&self, index: usize) -> usize {
        match &self.nodes[index] {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => {
                1 + self.depth_from(*left).max(self.depth_from(*right))
            }
        }
    }
}

/// How tree outputs combine into a margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Boosting: margins add up
    #[default]
    Sum,
    /// Forests: margins are averaged per output
    Mean,
}

fn default_base_score() -> Vec<f64> {
    vec![0.0]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub trees: Vec<DecisionTree>,
    /// One entry per output
    #[serde(default = "default_base_score")]
    pub base_score: Vec<f64>,
    #[serde(default)]
    pub aggregation: Aggregation,
    pub n_features: usize,
}

impl TreeEnsemble {
    pub fn n_outputs(&self) -> usize {
        self.base_score.len()
    }

    pub fn validate(&self) -> InsightResult<()> {
        if self.base_score.is_empty() {
            return Err(InsightError::InvalidModel("ensemble has no outputs".into()));
        }
        if self.trees.is_empty() {
            return Err(InsightError::InvalidModel("ensemble has no trees".into()));
        }
        for tree in &self.trees {
            tree.validate(self.n_features, self.n_outputs())?;
        }
        Ok(())
    }

    /// Output index holding the positive-class margin
    pub fn positive_output(&self) -> InsightResult<usize> {
        match self.n_outputs() {
            1 => Ok(0),
            2 => Ok(1),
            n => Err(InsightError::InvalidModel(format!(
                "{} outputs; only binary classifiers are supported",
                n
            ))),
        }
    }

    /// Scale applied to each tree's leaf values for its output
    pub fn tree_weights(&self) -> Vec<f64> {
        match self.aggregation {
            Aggregation::Sum => vec![1.0; self.trees.len()],
            Aggregation::Mean => {
                let mut counts = vec![0usize; self.n_outputs()];
                for tree in &self.trees {
                    counts[tree.output] += 1;
                }
                self.trees
                    .iter()
                    .map(|tree| 1.0 / counts[tree.output] as f64)
                    .collect()
            }
        }
    }

    /// Raw margins per output for one row
    pub fn margins(&self, x: &[f64]) -> Vec<f64> {
        let mut margins = self.base_score.clone();
        for (tree, weight) in self.trees.iter().zip(self.tree_weights()) {
            margins[tree.output] += weight * tree.predict(x);
        }
        margins
    }

    /// Expected margin per output over the training distribution
    pub fn expected_values(&self) -> Vec<f64> {
        let mut expected = self.base_score.clone();
        for (tree, weight) in self.trees.iter().zip(self.tree_weights()) {
            expected[tree.output] += weight * tree.expected_value();
        }
        expected
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::max_depth).max().unwrap_or(0)
    }
}
