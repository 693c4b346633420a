//! Model training: fit the classifier and gauge its quality.

use super::artifact::{DataTransformationArtifact, ModelTrainingArtifact, TransformedSplit};
use super::MODEL_FILE;
use crate::artifacts::{load_object, save_object};
use crate::config::TrainingConfig;
use crate::errors::PipelineError;
use crate::metrics::Metric;
use crate::models::{BoosterParams, GradientBooster};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// The model training stage.
///
/// Quality misses warn but do not fail the run: the promotion gate is the
/// evaluation stage, not training.
#[derive(Debug)]
pub struct ModelTraining<'a> {
    config: &'a TrainingConfig,
    stage_dir: PathBuf,
}

impl<'a> ModelTraining<'a> {
    /// Creates the stage under the given run directory.
    #[must_use]
    pub fn new(config: &'a TrainingConfig, run_dir: &Path) -> Self {
        Self {
            config,
            stage_dir: run_dir.join("model_training"),
        }
    }

    /// Trains the booster on the transformed arrays and persists it.
    pub fn run(
        &self,
        transformation: &DataTransformationArtifact,
    ) -> Result<ModelTrainingArtifact, PipelineError> {
        let training: TransformedSplit = load_object(&transformation.training_array_path)?;
        let test: TransformedSplit = load_object(&transformation.test_array_path)?;

        let params = BoosterParams {
            rounds: self.config.rounds,
            learning_rate: self.config.learning_rate,
        };
        info!(
            rounds = params.rounds,
            learning_rate = params.learning_rate,
            "training the gradient booster"
        );
        let model = GradientBooster::fit(&training.features, &training.labels, params)?;

        let positive = transformation.positive_class;
        let f1_training_score = Metric::F1.score(
            &training.labels,
            &model.predict(&training.features)?,
            positive,
        );
        let f1_test_score =
            Metric::F1.score(&test.labels, &model.predict(&test.features)?, positive);
        info!(f1_training_score, f1_test_score, "computed performance scores");

        if f1_test_score < self.config.expected_score {
            warn!(
                f1_test_score,
                expected = self.config.expected_score,
                "model performance misses the expected score"
            );
        }
        let gap = (f1_training_score - f1_test_score).abs();
        if gap > self.config.overfit_thresh {
            warn!(
                gap,
                threshold = self.config.overfit_thresh,
                "train/test gap exceeds the overfit threshold"
            );
        }

        let model_path = self.stage_dir.join("model").join(MODEL_FILE);
        save_object(&model_path, &model)?;

        Ok(ModelTrainingArtifact {
            model_path,
            f1_training_score,
            f1_test_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::artifact::TransformerArtifact;

    fn transformed_fixture(dir: &Path) -> DataTransformationArtifact {
        // Cleanly separable on the single feature.
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![f64::from(i)]).collect();
        let labels: Vec<usize> = (0..20).map(|i| usize::from(i >= 10)).collect();

        let training_array_path = dir.join("training_set.bin");
        save_object(
            &training_array_path,
            &TransformedSplit {
                features: features.clone(),
                labels: labels.clone(),
            },
        )
        .unwrap();
        let test_array_path = dir.join("test_set.bin");
        save_object(&test_array_path, &TransformedSplit { features, labels }).unwrap();

        DataTransformationArtifact {
            pipeline: TransformerArtifact::Combined {
                pipeline_path: dir.join("unused.bin"),
            },
            positive_class: 1,
            training_array_path,
            test_array_path,
        }
    }

    #[test]
    fn test_trains_and_persists_model() {
        let dir = tempfile::tempdir().unwrap();
        let transformation = transformed_fixture(dir.path());
        let config = TrainingConfig::default();

        let artifact = ModelTraining::new(&config, dir.path())
            .run(&transformation)
            .unwrap();

        assert!((artifact.f1_training_score - 1.0).abs() < 1e-9);
        assert!((artifact.f1_test_score - 1.0).abs() < 1e-9);

        let model: GradientBooster = load_object(&artifact.model_path).unwrap();
        assert_eq!(model.n_features(), 1);
    }
}
