//! Artifact records produced by each training-pipeline stage.

use crate::artifacts::{load_object, ArtifactBundle, BundleShape};
use crate::errors::PipelineError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output of the data ingestion stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataIngestionArtifact {
    /// The full ingested dataset, persisted as CSV.
    pub feature_store_path: PathBuf,
    /// The training split.
    pub training_path: PathBuf,
    /// The held-out test split.
    pub test_path: PathBuf,
}

/// Output of the data validation stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataValidationArtifact {
    /// The YAML validation report.
    pub report_path: PathBuf,
}

/// Where the fitted transformation objects of a run live.
///
/// The two variants mirror the two bundle shapes, so an inconsistent
/// shape/path combination cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformerArtifact {
    /// Standalone transformer and target encoder.
    Split {
        /// The fitted transformer.
        transformer_path: PathBuf,
        /// The fitted target encoder.
        encoder_path: PathBuf,
    },
    /// One jointly fitted pipeline object.
    Combined {
        /// The fitted combined pipeline.
        pipeline_path: PathBuf,
    },
}

impl TransformerArtifact {
    /// The bundle shape this artifact corresponds to.
    #[must_use]
    pub fn shape(&self) -> BundleShape {
        match self {
            Self::Split { .. } => BundleShape::Split,
            Self::Combined { .. } => BundleShape::Combined,
        }
    }
}

/// Transformed feature rows and encoded labels for one split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformedSplit {
    /// Row-major feature matrix.
    pub features: Vec<Vec<f64>>,
    /// Encoded class labels, aligned with `features`.
    pub labels: Vec<usize>,
}

/// Output of the data transformation stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTransformationArtifact {
    /// The fitted transformation objects.
    pub pipeline: TransformerArtifact,
    /// Encoded index of the positive (fault) class.
    pub positive_class: usize,
    /// The transformed training split.
    pub training_array_path: PathBuf,
    /// The transformed test split.
    pub test_array_path: PathBuf,
}

impl DataTransformationArtifact {
    /// Reassembles the candidate bundle from this run's fitted objects.
    pub fn load_bundle(&self, model_path: &Path) -> Result<ArtifactBundle, PipelineError> {
        let model = load_object(model_path)?;
        Ok(match &self.pipeline {
            TransformerArtifact::Split {
                transformer_path,
                encoder_path,
            } => ArtifactBundle::Split {
                transformer: load_object(transformer_path)?,
                encoder: load_object(encoder_path)?,
                model,
            },
            TransformerArtifact::Combined { pipeline_path } => ArtifactBundle::Combined {
                pipeline: load_object(pipeline_path)?,
                model,
            },
        })
    }
}

/// Output of the model training stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelTrainingArtifact {
    /// The trained classifier.
    pub model_path: PathBuf,
    /// F1 on the training split.
    pub f1_training_score: f64,
    /// F1 on the held-out test split.
    pub f1_test_score: f64,
}

/// Output of the model pushing stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPushingArtifact {
    /// The registry version that was published.
    pub version: u64,
    /// The published version directory.
    pub saved_dir: PathBuf,
}
