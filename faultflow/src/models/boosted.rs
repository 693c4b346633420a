//! Gradient-boosted decision stumps with logistic loss.
//!
//! A deliberately small boosted-trees classifier: depth-one trees, exhaustive
//! threshold search, Newton leaf values with L2 regularization, and shrinkage.
//! The rest of the pipeline treats it as an opaque artifact; only `fit` and
//! `predict` are part of its contract.

use crate::errors::ModelError;
use serde::{Deserialize, Serialize};

const LAMBDA: f64 = 1.0;
const PROBABILITY_FLOOR: f64 = 1e-6;

/// One depth-one tree: rows with `feature <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stump {
    /// Index of the split feature.
    pub feature: usize,
    /// Split threshold.
    pub threshold: f64,
    /// Leaf value added for rows going left.
    pub left: f64,
    /// Leaf value added for rows going right.
    pub right: f64,
}

/// Training parameters for the booster.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoosterParams {
    /// Number of boosting rounds.
    pub rounds: usize,
    /// Shrinkage applied to each stump's contribution.
    pub learning_rate: f64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            rounds: 50,
            learning_rate: 0.3,
        }
    }
}

/// A fitted binary classifier over transformed feature rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBooster {
    n_features: usize,
    init_score: f64,
    learning_rate: f64,
    stumps: Vec<Stump>,
}

impl GradientBooster {
    /// Fits the booster on a row-major matrix and 0/1 class codes.
    pub fn fit(x: &[Vec<f64>], y: &[usize], params: BoosterParams) -> Result<Self, ModelError> {
        if x.is_empty() || y.is_empty() {
            return Err(ModelError::EmptyFit);
        }
        let n_features = x[0].len();
        for row in x {
            if row.len() != n_features {
                return Err(ModelError::FeatureMismatch {
                    expected: n_features,
                    found: row.len(),
                });
            }
        }
        let n_classes = y.iter().max().map_or(0, |m| m + 1);
        if n_classes > 2 {
            return Err(ModelError::NonBinaryTarget { n_classes });
        }

        let positive_rate = (y.iter().filter(|&&label| label == 1).count() as f64
            / y.len() as f64)
            .clamp(PROBABILITY_FLOOR, 1.0 - PROBABILITY_FLOOR);
        let init_score = (positive_rate / (1.0 - positive_rate)).ln();

        let mut scores = vec![init_score; y.len()];
        let mut stumps = Vec::with_capacity(params.rounds);

        for _ in 0..params.rounds {
            let gradients: Vec<f64> = scores
                .iter()
                .zip(y)
                .map(|(&score, &label)| label as f64 - sigmoid(score))
                .collect();
            let hessians: Vec<f64> = scores
                .iter()
                .map(|&score| {
                    let p = sigmoid(score);
                    p * (1.0 - p)
                })
                .collect();

            let Some(stump) = best_stump(x, &gradients, &hessians, n_features) else {
                break;
            };
            for (row, score) in x.iter().zip(scores.iter_mut()) {
                let leaf = if row[stump.feature] <= stump.threshold {
                    stump.left
                } else {
                    stump.right
                };
                *score += params.learning_rate * leaf;
            }
            stumps.push(stump);
        }

        Ok(Self {
            n_features,
            init_score,
            learning_rate: params.learning_rate,
            stumps,
        })
    }

    /// Rebuilds a booster from fitted parts.
    #[must_use]
    pub fn from_parts(
        n_features: usize,
        init_score: f64,
        learning_rate: f64,
        stumps: Vec<Stump>,
    ) -> Self {
        Self {
            n_features,
            init_score,
            learning_rate,
            stumps,
        }
    }

    /// Number of features the booster was fitted on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Raw additive score (log-odds) for one row.
    pub fn decision_score(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureMismatch {
                expected: self.n_features,
                found: row.len(),
            });
        }
        let mut score = self.init_score;
        for stump in &self.stumps {
            let leaf = if row[stump.feature] <= stump.threshold {
                stump.left
            } else {
                stump.right
            };
            score += self.learning_rate * leaf;
        }
        Ok(score)
    }

    /// Probability of the positive class for one row.
    pub fn predict_proba(&self, row: &[f64]) -> Result<f64, ModelError> {
        Ok(sigmoid(self.decision_score(row)?))
    }

    /// Predicted 0/1 class codes for a row-major matrix.
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<usize>, ModelError> {
        x.iter()
            .map(|row| Ok(usize::from(self.predict_proba(row)? > 0.5)))
            .collect()
    }
}

fn sigmoid(score: f64) -> f64 {
    1.0 / (1.0 + (-score).exp())
}

/// Exhaustive search for the stump maximizing the regularized gain.
fn best_stump(
    x: &[Vec<f64>],
    gradients: &[f64],
    hessians: &[f64],
    n_features: usize,
) -> Option<Stump> {
    let total_g: f64 = gradients.iter().sum();
    let total_h: f64 = hessians.iter().sum();
    let no_split_gain = total_g * total_g / (total_h + LAMBDA);

    let mut best: Option<(f64, Stump)> = None;

    for feature in 0..n_features {
        let mut order: Vec<usize> = (0..x.len()).collect();
        order.sort_by(|&a, &b| x[a][feature].total_cmp(&x[b][feature]));

        let mut left_g = 0.0;
        let mut left_h = 0.0;
        for window in 0..order.len().saturating_sub(1) {
            let row = order[window];
            left_g += gradients[row];
            left_h += hessians[row];

            let here = x[row][feature];
            let next = x[order[window + 1]][feature];
            if here == next {
                continue;
            }

            let right_g = total_g - left_g;
            let right_h = total_h - left_h;
            let gain = left_g * left_g / (left_h + LAMBDA)
                + right_g * right_g / (right_h + LAMBDA)
                - no_split_gain;
            if gain <= 1e-12 {
                continue;
            }

            if best.as_ref().map_or(true, |(best_gain, _)| gain > *best_gain) {
                best = Some((
                    gain,
                    Stump {
                        feature,
                        threshold: (here + next) / 2.0,
                        left: left_g / (left_h + LAMBDA),
                        right: right_g / (right_h + LAMBDA),
                    },
                ));
            }
        }
    }

    best.map(|(_, stump)| stump)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..10 {
            x.push(vec![i as f64 / 10.0, 0.0]);
            y.push(0);
        }
        for i in 0..10 {
            x.push(vec![2.0 + i as f64 / 10.0, 0.0]);
            y.push(1);
        }
        (x, y)
    }

    #[test]
    fn test_learns_separable_threshold() {
        let (x, y) = separable_data();
        let model = GradientBooster::fit(&x, &y, BoosterParams::default()).unwrap();

        let predictions = model.predict(&x).unwrap();
        assert_eq!(predictions, y);
    }

    #[test]
    fn test_rejects_empty_and_ragged_input() {
        assert!(matches!(
            GradientBooster::fit(&[], &[], BoosterParams::default()),
            Err(ModelError::EmptyFit)
        ));

        let x = vec![vec![1.0, 2.0], vec![3.0]];
        let y = vec![0, 1];
        assert!(matches!(
            GradientBooster::fit(&x, &y, BoosterParams::default()),
            Err(ModelError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_multiclass_target() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0]];
        let y = vec![0, 1, 2];
        assert!(matches!(
            GradientBooster::fit(&x, &y, BoosterParams::default()),
            Err(ModelError::NonBinaryTarget { n_classes: 3 })
        ));
    }

    #[test]
    fn test_predict_checks_row_width() {
        let (x, y) = separable_data();
        let model = GradientBooster::fit(&x, &y, BoosterParams::default()).unwrap();
        let result = model.predict(&[vec![1.0]]);
        assert!(matches!(result, Err(ModelError::FeatureMismatch { .. })));
    }

    #[test]
    fn test_from_parts_single_stump() {
        // One hard stump: predicts positive above 0.5.
        let model = GradientBooster::from_parts(
            1,
            0.0,
            1.0,
            vec![Stump {
                feature: 0,
                threshold: 0.5,
                left: -10.0,
                right: 10.0,
            }],
        );
        let predictions = model.predict(&[vec![0.0], vec![1.0]]).unwrap();
        assert_eq!(predictions, vec![0, 1]);
    }

    #[test]
    fn test_constant_feature_learns_prior() {
        // No split has positive gain; the prior decides for the majority class.
        let x = vec![vec![1.0]; 8];
        let y = vec![1, 1, 1, 1, 1, 1, 0, 0];
        let model = GradientBooster::fit(&x, &y, BoosterParams::default()).unwrap();
        let predictions = model.predict(&x).unwrap();
        assert!(predictions.iter().all(|&p| p == 1));
    }
}
