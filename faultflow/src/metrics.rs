//! Classification metrics for the promotion decision.

use serde::{Deserialize, Serialize};

/// Confusion counts for one positive class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    /// Positive rows predicted positive.
    pub true_positives: usize,
    /// Negative rows predicted positive.
    pub false_positives: usize,
    /// Positive rows predicted negative.
    pub false_negatives: usize,
    /// Negative rows predicted negative.
    pub true_negatives: usize,
}

impl ConfusionCounts {
    /// Tallies counts from paired encoded labels.
    ///
    /// Both slices must refer to the same rows in the same order.
    #[must_use]
    pub fn from_predictions(y_true: &[usize], y_pred: &[usize], positive: usize) -> Self {
        let mut counts = Self::default();
        for (&truth, &pred) in y_true.iter().zip(y_pred) {
            match (truth == positive, pred == positive) {
                (true, true) => counts.true_positives += 1,
                (false, true) => counts.false_positives += 1,
                (true, false) => counts.false_negatives += 1,
                (false, false) => counts.true_negatives += 1,
            }
        }
        counts
    }

    /// Precision on the positive class, 0.0 when nothing was predicted positive.
    #[must_use]
    pub fn precision(&self) -> f64 {
        let predicted = self.true_positives + self.false_positives;
        if predicted == 0 {
            0.0
        } else {
            self.true_positives as f64 / predicted as f64
        }
    }

    /// Recall on the positive class, 0.0 when no positive rows exist.
    #[must_use]
    pub fn recall(&self) -> f64 {
        let actual = self.true_positives + self.false_negatives;
        if actual == 0 {
            0.0
        } else {
            self.true_positives as f64 / actual as f64
        }
    }

    /// F1 score, the harmonic mean of precision and recall.
    #[must_use]
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

/// The scalar metric used to compare champion and challenger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Binary F1 on the positive (fault) class.
    #[default]
    F1,
    /// Precision on the positive class.
    Precision,
    /// Recall on the positive class.
    Recall,
}

impl Metric {
    /// Scores paired encoded labels against the given positive class.
    #[must_use]
    pub fn score(&self, y_true: &[usize], y_pred: &[usize], positive: usize) -> f64 {
        let counts = ConfusionCounts::from_predictions(y_true, y_pred, positive);
        match self {
            Self::F1 => counts.f1(),
            Self::Precision => counts.precision(),
            Self::Recall => counts.recall(),
        }
    }
}
