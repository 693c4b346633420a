//! Target encoder: maps class labels to dense indices and back.

use crate::errors::ModelError;
use serde::{Deserialize, Serialize};

/// A label codebook fitted on the training split.
///
/// Classes are numbered in order of first appearance, so the numeric code of
/// a label is an artifact of the split that fitted this encoder. Two registry
/// versions may encode the same label differently; scoring must always pair a
/// model with the encoder it was trained alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEncoder {
    classes: Vec<String>,
}

impl TargetEncoder {
    /// Fits the codebook on a label column.
    #[must_use]
    pub fn fit(labels: &[String]) -> Self {
        let mut classes: Vec<String> = Vec::new();
        for label in labels {
            if !classes.contains(label) {
                classes.push(label.clone());
            }
        }
        Self { classes }
    }

    /// Rebuilds an encoder from a fitted class list.
    #[must_use]
    pub fn from_classes(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// The fitted classes, in code order.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of fitted classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Encodes one label.
    pub fn encode_label(&self, label: &str) -> Result<usize, ModelError> {
        self.classes
            .iter()
            .position(|c| c == label)
            .ok_or_else(|| ModelError::UnknownLabel {
                label: label.to_string(),
            })
    }

    /// Encodes a label column.
    pub fn encode(&self, labels: &[String]) -> Result<Vec<usize>, ModelError> {
        labels
            .iter()
            .map(|label| self.encode_label(label))
            .collect()
    }

    /// Decodes class indices back to labels.
    pub fn decode(&self, codes: &[usize]) -> Result<Vec<String>, ModelError> {
        codes
            .iter()
            .map(|&index| {
                self.classes
                    .get(index)
                    .cloned()
                    .ok_or(ModelError::UnknownClass {
                        index,
                        n_classes: self.classes.len(),
                    })
            })
            .collect()
    }
}
