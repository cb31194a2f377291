//! Gradient-boosted regression trees
//!
//! Least-squares boosting over depth-limited CART trees. Training is
//! deterministic: split search scans features in index order and samples in
//! a stable sort order, and ties keep the first candidate found.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::features::{FeatureVector, FEATURE_COUNT};
use crate::error::{OptimizerError, Result};

/// Smallest squared-error reduction that justifies a split
const MIN_SPLIT_GAIN: f64 = 1e-12;

/// Boosting hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoostingParams {
    pub n_estimators: usize,
    pub learning_rate: f64,
    pub max_depth: usize,
    pub min_samples_leaf: usize,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
        }
    }
}

/// Node of a regression tree, stored in a flat arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Samples with `features[feature] <= threshold` go left
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A least-squares regression tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl RegressionTree {
    /// Fit a tree to `targets`
    pub fn fit(
        features: &[FeatureVector],
        targets: &[f64],
        max_depth: usize,
        min_samples_leaf: usize,
    ) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        let indices: Vec<usize> = (0..targets.len()).collect();
        tree.grow(features, targets, indices, 0, max_depth, min_samples_leaf.max(1));
        tree
    }

    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let mut node = 0;
        loop {
            match self.nodes.get(node) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    node = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Some(TreeNode::Leaf { value }) => return *value,
                None => return 0.0,
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    /// Check that every split references existing nodes further down the
    /// arena, so prediction always terminates
    fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(OptimizerError::model("regression tree has no nodes"));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= FEATURE_COUNT {
                    return Err(OptimizerError::model(format!(
                        "node {} splits on unknown feature {}",
                        id, feature
                    )));
                }
                if *left <= id || *right <= id || *left >= self.nodes.len() || *right >= self.nodes.len() {
                    return Err(OptimizerError::model(format!(
                        "node {} has invalid children",
                        id
                    )));
                }
            }
        }
        Ok(())
    }

    fn grow(
        &mut self,
        features: &[FeatureVector],
        targets: &[f64],
        indices: Vec<usize>,
        depth: usize,
        max_depth: usize,
        min_samples_leaf: usize,
    ) -> usize {
        let id = self.nodes.len();
        let value = if indices.is_empty() {
            0.0
        } else {
            indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
        };
        self.nodes.push(TreeNode::Leaf { value });

        if depth >= max_depth || indices.len() < 2 * min_samples_leaf {
            return id;
        }

        let Some(split) = best_split(features, targets, &indices, min_samples_leaf) else {
            return id;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| features[i][split.feature] <= split.threshold);

        let left = self.grow(features, targets, left_indices, depth + 1, max_depth, min_samples_leaf);
        let right = self.grow(features, targets, right_indices, depth + 1, max_depth, min_samples_leaf);

        self.nodes[id] = TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }
}

/// Find the split with the largest reduction in squared error
fn best_split(
    features: &[FeatureVector],
    targets: &[f64],
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<SplitCandidate> {
    let n = indices.len();
    let total: f64 = indices.iter().map(|&i| targets[i]).sum();
    let parent_score = total * total / n as f64;

    let mut best: Option<SplitCandidate> = None;
    let mut order = indices.to_vec();

    for feature in 0..FEATURE_COUNT {
        order.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

        let mut left_sum = 0.0;
        for k in 0..n - 1 {
            left_sum += targets[order[k]];

            let lower = features[order[k]][feature];
            let upper = features[order[k + 1]][feature];
            if lower == upper {
                continue;
            }

            let n_left = k + 1;
            let n_right = n - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let right_sum = total - left_sum;
            let gain = left_sum * left_sum / n_left as f64 + right_sum * right_sum / n_right as f64
                - parent_score;

            let best_gain = best.as_ref().map_or(MIN_SPLIT_GAIN, |b| b.gain);
            if gain > best_gain {
                best = Some(SplitCandidate {
                    feature,
                    threshold: midpoint(lower, upper),
                    gain,
                });
            }
        }
    }

    best
}

/// Threshold strictly separating `lower` from `upper`
fn midpoint(lower: f64, upper: f64) -> f64 {
    let mid = lower + (upper - lower) / 2.0;
    if mid >= upper {
        lower
    } else {
        mid
    }
}

/// Boosted ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostedRegressor {
    params: BoostingParams,
    base_prediction: f64,
    trees: Vec<RegressionTree>,

    /// Predictions are bounded to the target range seen in training
    output_min: f64,
    output_max: f64,
}

impl GradientBoostedRegressor {
    /// Fit the ensemble to `(features, targets)`
    pub fn fit(features: &[FeatureVector], targets: &[f64], params: BoostingParams) -> Result<Self> {
        if features.len() != targets.len() {
            return Err(OptimizerError::model(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }
        if targets.is_empty() {
            return Err(OptimizerError::model("cannot fit on an empty training set"));
        }
        if params.n_estimators == 0 || params.max_depth == 0 {
            return Err(OptimizerError::model("n_estimators and max_depth must be positive"));
        }
        if !(params.learning_rate > 0.0 && params.learning_rate <= 1.0) {
            return Err(OptimizerError::model(format!(
                "learning_rate {} outside (0, 1]",
                params.learning_rate
            )));
        }
        if let Some(bad) = targets.iter().find(|t| !t.is_finite()) {
            return Err(OptimizerError::model(format!("non-finite target {}", bad)));
        }

        let n = targets.len();
        let base_prediction = targets.iter().sum::<f64>() / n as f64;
        let output_min = targets.iter().copied().fold(f64::INFINITY, f64::min);
        let output_max = targets.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut predictions = vec![base_prediction; n];
        let mut residuals = vec![0.0; n];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for round in 0..params.n_estimators {
            for i in 0..n {
                residuals[i] = targets[i] - predictions[i];
            }

            let tree = RegressionTree::fit(features, &residuals, params.max_depth, params.min_samples_leaf);
            for i in 0..n {
                predictions[i] += params.learning_rate * tree.predict(&features[i]);
            }

            if round % 25 == 0 {
                let mse = residuals.iter().map(|r| r * r).sum::<f64>() / n as f64;
                debug!(round, mse, leaves = tree.leaf_count(), "Boosting round");
            }
            trees.push(tree);
        }

        Ok(Self {
            params,
            base_prediction,
            trees,
            output_min,
            output_max,
        })
    }

    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let raw = self.base_prediction
            + self.params.learning_rate
                * self.trees.iter().map(|t| t.predict(features)).sum::<f64>();
        raw.max(self.output_min).min(self.output_max)
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Structural check for models loaded from disk
    pub fn validate(&self) -> Result<()> {
        if !(self.base_prediction.is_finite() && self.output_min <= self.output_max) {
            return Err(OptimizerError::model("regressor bounds are malformed"));
        }
        self.trees.iter().try_for_each(RegressionTree::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(x: f64) -> FeatureVector {
        let mut features = [0.0; FEATURE_COUNT];
        features[0] = x;
        features
    }

    #[test]
    fn test_tree_fits_step_function() {
        let features: Vec<FeatureVector> = (0..10).map(|i| row(i as f64)).collect();
        let targets: Vec<f64> = (0..10).map(|i| if i < 5 { 1.0 } else { 3.0 }).collect();

        let tree = RegressionTree::fit(&features, &targets, 1, 1);

        assert_eq!(tree.node_count(), 3);
        assert_eq!(tree.predict(&row(2.0)), 1.0);
        assert_eq!(tree.predict(&row(7.0)), 3.0);
        // threshold sits between 4 and 5
        assert_eq!(tree.predict(&row(4.5)), 1.0);
    }

    #[test]
    fn test_tree_respects_min_samples_leaf() {
        let features: Vec<FeatureVector> = (0..6).map(|i| row(i as f64)).collect();
        let targets = vec![0.0, 0.0, 0.0, 0.0, 0.0, 10.0];

        let tree = RegressionTree::fit(&features, &targets, 3, 3);

        // only the 3/3 split is allowed, and neither side can split again
        assert_eq!(tree.leaf_count(), 2);
    }

    #[test]
    fn test_constant_targets_make_single_leaf() {
        let features: Vec<FeatureVector> = (0..8).map(|i| row(i as f64)).collect();
        let targets = vec![2.5; 8];

        let tree = RegressionTree::fit(&features, &targets, 3, 1);

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict(&row(100.0)), 2.5);
    }

    #[test]
    fn test_boosting_reduces_error() {
        let features: Vec<FeatureVector> = (0..200).map(|i| row(i as f64)).collect();
        let targets: Vec<f64> = (0..200).map(|i| (i as f64) * 0.5).collect();

        let model = GradientBoostedRegressor::fit(&features, &targets, BoostingParams::default()).unwrap();

        let mse = features
            .iter()
            .zip(&targets)
            .map(|(x, y)| (model.predict(x) - y).powi(2))
            .sum::<f64>()
            / targets.len() as f64;
        assert!(mse < 25.0, "mse {}", mse);
        assert_eq!(model.tree_count(), 100);
    }

    #[test]
    fn test_predictions_bounded_by_training_range() {
        let features: Vec<FeatureVector> = (0..50).map(|i| row(i as f64)).collect();
        let targets: Vec<f64> = (0..50).map(|i| 1.0 + (i % 5) as f64 * 0.01).collect();

        let model = GradientBoostedRegressor::fit(&features, &targets, BoostingParams::default()).unwrap();

        for x in [-1000.0, 0.0, 25.0, 1e9] {
            let y = model.predict(&row(x));
            assert!((1.0..=1.04).contains(&y), "prediction {}", y);
        }
    }

    #[test]
    fn test_fit_rejects_bad_input() {
        let features = vec![row(1.0)];
        assert!(GradientBoostedRegressor::fit(&features, &[], BoostingParams::default()).is_err());
        assert!(GradientBoostedRegressor::fit(&[], &[], BoostingParams::default()).is_err());
        assert!(GradientBoostedRegressor::fit(&features, &[f64::NAN], BoostingParams::default()).is_err());

        let params = BoostingParams {
            learning_rate: 0.0,
            ..BoostingParams::default()
        };
        assert!(GradientBoostedRegressor::fit(&features, &[1.0], params).is_err());
    }

    #[test]
    fn test_serialized_model_predicts_identically() {
        let features: Vec<FeatureVector> = (0..40).map(|i| row(i as f64)).collect();
        let targets: Vec<f64> = (0..40).map(|i| (i as f64).sqrt()).collect();
        let model = GradientBoostedRegressor::fit(&features, &targets, BoostingParams::default()).unwrap();

        let json = serde_json::to_string(&model).unwrap();
        let restored: GradientBoostedRegressor = serde_json::from_str(&json).unwrap();

        assert!(restored.validate().is_ok());
        for x in &features {
            assert_eq!(model.predict(x), restored.predict(x));
        }
    }
}
