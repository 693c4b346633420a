//! The training and batch-prediction pipelines.
//!
//! Stages run sequentially inside one process; every stage consumes the
//! artifact records of its predecessors and persists its own outputs under a
//! per-run artifact directory. The registry is only ever written by the
//! pushing stage, and only after a positive promotion decision.

mod artifact;
mod ingestion;
mod prediction;
mod pushing;
mod training;
mod transformation;
mod validation;

#[cfg(test)]
mod integration_tests;

pub use artifact::{
    DataIngestionArtifact, DataTransformationArtifact, DataValidationArtifact,
    ModelPushingArtifact, ModelTrainingArtifact, TransformedSplit, TransformerArtifact,
};
pub use ingestion::{CsvDataSource, DataIngestion, DataSource};
pub use prediction::BatchPredictionPipeline;
pub use pushing::ModelPushing;
pub use training::ModelTraining;
pub use transformation::DataTransformation;
pub use validation::{ColumnDrift, DataValidation, SplitFindings, ValidationReport};

use crate::config::PipelineConfig;
use crate::dataset::Table;
use crate::errors::PipelineError;
use crate::evaluation::{EvaluationArtifact, ModelEvaluation};
use crate::metrics::Metric;
use crate::registry::ModelRegistry;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

pub(crate) const FEATURE_STORE_FILE: &str = "sensors.csv";
pub(crate) const TRAINING_FILE: &str = "training_set.csv";
pub(crate) const TEST_FILE: &str = "test_set.csv";
pub(crate) const TRAINING_ARRAY_FILE: &str = "training_set.bin";
pub(crate) const TEST_ARRAY_FILE: &str = "test_set.bin";
pub(crate) const TRANSFORMER_FILE: &str = "transformer.bin";
pub(crate) const ENCODER_FILE: &str = "encoder.bin";
pub(crate) const MODEL_FILE: &str = "model.bin";
pub(crate) const REPORT_FILE: &str = "report.yaml";

/// How a completed training run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionOutcome {
    /// The candidate was published as the new production version.
    Promoted {
        /// The registry version that was created.
        version: u64,
        /// The promotion decision record.
        evaluation: EvaluationArtifact,
    },
    /// The candidate did not clear the threshold; the deployed model stays.
    NotPromoted {
        /// Test-set score of the deployed model.
        champion_score: f64,
        /// Test-set score of the candidate.
        challenger_score: f64,
    },
}

/// Summary of one completed training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    /// The run's artifact directory.
    pub run_dir: PathBuf,
    /// The training stage's artifact.
    pub training: ModelTrainingArtifact,
    /// Whether and how the candidate was promoted.
    pub outcome: PromotionOutcome,
}

/// The end-to-end training pipeline.
pub struct TrainingPipeline<S: DataSource> {
    source: S,
    config: PipelineConfig,
    registry: ModelRegistry,
    run_dir: PathBuf,
}

impl<S: DataSource> TrainingPipeline<S> {
    /// Creates a pipeline run, opening the registry and picking a fresh
    /// timestamped artifact directory.
    pub fn new(source: S, config: PipelineConfig) -> Result<Self, PipelineError> {
        let registry = ModelRegistry::open(config.registry.clone())?;
        let run_dir = config
            .artifact_root
            .join(format!("run-{}", Utc::now().format("%Y%m%dT%H%M%S%3f")));
        Ok(Self {
            source,
            config,
            registry,
            run_dir,
        })
    }

    /// The run's artifact directory.
    #[must_use]
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// The registry this run promotes into.
    #[must_use]
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Runs every stage in order.
    ///
    /// A candidate that fails the promotion threshold is a completed run with
    /// a [`PromotionOutcome::NotPromoted`] outcome, not an error; every other
    /// failure aborts the run and propagates.
    pub fn run(&self) -> Result<TrainingSummary, PipelineError> {
        info!(run_dir = %self.run_dir.display(), "training pipeline starting");

        let ingestion =
            DataIngestion::new(&self.source, &self.config.ingestion, &self.run_dir).run()?;
        let _validation =
            DataValidation::new(&self.config.validation, &self.run_dir).run(&ingestion)?;
        let transformation = DataTransformation::new(
            &self.config.transformation,
            &self.config.target,
            &self.config.positive_label,
            &self.run_dir,
        )
        .run(&ingestion)?;
        let training = ModelTraining::new(&self.config.training, &self.run_dir)
            .run(&transformation)?;

        let candidate = transformation.load_bundle(&training.model_path)?;
        let test_set = Table::from_csv_path(&ingestion.test_path)?;
        let evaluation = ModelEvaluation::new(
            &self.registry,
            self.config.evaluation.clone(),
            Metric::F1,
            &self.config.target,
            &self.config.positive_label,
        );

        let outcome = match evaluation.evaluate(&candidate, &test_set) {
            Ok(artifact) => {
                let pushed = ModelPushing::new(&self.registry).run(&transformation, &training)?;
                PromotionOutcome::Promoted {
                    version: pushed.version,
                    evaluation: artifact,
                }
            }
            Err(PipelineError::NotImproved(err)) => {
                info!(
                    champion_score = err.champion_score,
                    challenger_score = err.challenger_score,
                    "run completed without promotion"
                );
                PromotionOutcome::NotPromoted {
                    champion_score: err.champion_score,
                    challenger_score: err.challenger_score,
                }
            }
            Err(err) => return Err(err),
        };

        info!("training pipeline completed");
        Ok(TrainingSummary {
            run_dir: self.run_dir.clone(),
            training,
            outcome,
        })
    }
}
