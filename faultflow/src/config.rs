//! Configuration types for the training and prediction pipelines.
//!
//! Everything the original design sourced from process-wide globals lives in
//! explicit config structs handed to the components that need them: registry
//! root and subpath names, promotion threshold, split parameters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the on-disk model registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Root directory holding the integer-named version directories.
    #[serde(default = "default_registry_root")]
    pub root: PathBuf,
    /// Subdirectory of a version holding the model file.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,
    /// Subdirectory of a version holding the transformer file.
    #[serde(default = "default_transformer_dir")]
    pub transformer_dir: String,
    /// Subdirectory of a version holding the target-encoder file.
    #[serde(default = "default_encoder_dir")]
    pub encoder_dir: String,
    /// File name of the serialized model.
    #[serde(default = "default_model_file")]
    pub model_file: String,
    /// File name of the serialized transformer.
    #[serde(default = "default_transformer_file")]
    pub transformer_file: String,
    /// File name of the serialized target encoder.
    #[serde(default = "default_encoder_file")]
    pub encoder_file: String,
    /// How many contested version slots a publish tolerates before failing.
    #[serde(default = "default_publish_attempts")]
    pub publish_attempts: usize,
}

fn default_registry_root() -> PathBuf {
    PathBuf::from("saved_models")
}

fn default_model_dir() -> String {
    "model".to_string()
}

fn default_transformer_dir() -> String {
    "transformer".to_string()
}

fn default_encoder_dir() -> String {
    "encoder".to_string()
}

fn default_model_file() -> String {
    "model.bin".to_string()
}

fn default_transformer_file() -> String {
    "transformer.bin".to_string()
}

fn default_encoder_file() -> String {
    "encoder.bin".to_string()
}

fn default_publish_attempts() -> usize {
    3
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: default_registry_root(),
            model_dir: default_model_dir(),
            transformer_dir: default_transformer_dir(),
            encoder_dir: default_encoder_dir(),
            model_file: default_model_file(),
            transformer_file: default_transformer_file(),
            encoder_file: default_encoder_file(),
            publish_attempts: default_publish_attempts(),
        }
    }
}

impl RegistryConfig {
    /// Creates a registry configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the registry root.
    #[must_use]
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Sets the number of publish attempts.
    #[must_use]
    pub fn with_publish_attempts(mut self, attempts: usize) -> Self {
        self.publish_attempts = attempts;
        self
    }
}

/// Configuration for the champion/challenger promotion decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Minimum score improvement the candidate must strictly exceed.
    #[serde(default = "default_min_improvement")]
    pub min_improvement: f64,
}

fn default_min_improvement() -> f64 {
    0.01
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            min_improvement: default_min_improvement(),
        }
    }
}

impl EvaluationConfig {
    /// Creates an evaluation configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum improvement threshold.
    #[must_use]
    pub fn with_min_improvement(mut self, min_improvement: f64) -> Self {
        self.min_improvement = min_improvement;
        self
    }
}

/// Configuration for the data ingestion stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Fraction of rows held out as the test set.
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed for the split shuffle.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_seed() -> u64 {
    42
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            seed: default_seed(),
        }
    }
}

/// Configuration for the data validation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Missing-value ratio above which a column is reported as redundant.
    #[serde(default = "default_missing_thresh")]
    pub missing_thresh: f64,
    /// Standardized mean-shift above which a column is reported as drifted.
    #[serde(default = "default_drift_thresh")]
    pub drift_thresh: f64,
}

fn default_missing_thresh() -> f64 {
    0.3
}

fn default_drift_thresh() -> f64 {
    2.0
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            missing_thresh: default_missing_thresh(),
            drift_thresh: default_drift_thresh(),
        }
    }
}

/// Configuration for the data transformation stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationConfig {
    /// Fill value for missing feature cells.
    #[serde(default)]
    pub fill_value: f64,
    /// When true, the transformer and target codebook are fitted jointly and
    /// serialized as one combined pipeline object with no standalone encoder.
    #[serde(default)]
    pub combined_pipeline: bool,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            fill_value: 0.0,
            combined_pipeline: false,
        }
    }
}

/// Configuration for the model training stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Test-set score below which a quality warning is logged.
    #[serde(default = "default_expected_score")]
    pub expected_score: f64,
    /// Train/test score gap above which an overfit warning is logged.
    #[serde(default = "default_overfit_thresh")]
    pub overfit_thresh: f64,
    /// Number of boosting rounds.
    #[serde(default = "default_rounds")]
    pub rounds: usize,
    /// Shrinkage applied to each boosting round.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
}

fn default_expected_score() -> f64 {
    0.85
}

fn default_overfit_thresh() -> f64 {
    0.1
}

fn default_rounds() -> usize {
    50
}

fn default_learning_rate() -> f64 {
    0.3
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            expected_score: default_expected_score(),
            overfit_thresh: default_overfit_thresh(),
            rounds: default_rounds(),
            learning_rate: default_learning_rate(),
        }
    }
}

/// Configuration for the batch prediction pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Directory receiving timestamped prediction files.
    #[serde(default = "default_prediction_dir")]
    pub output_dir: PathBuf,
    /// Name of the appended prediction column.
    #[serde(default = "default_prediction_column")]
    pub prediction_column: String,
}

fn default_prediction_dir() -> PathBuf {
    PathBuf::from("predictions")
}

fn default_prediction_column() -> String {
    "prediction".to_string()
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            output_dir: default_prediction_dir(),
            prediction_column: default_prediction_column(),
        }
    }
}

/// Top-level configuration for a training pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory receiving per-run stage artifacts.
    #[serde(default = "default_artifact_root")]
    pub artifact_root: PathBuf,
    /// Name of the ground-truth column.
    #[serde(default = "default_target")]
    pub target: String,
    /// Label of the fault class the F1 metric is computed on.
    #[serde(default = "default_positive_label")]
    pub positive_label: String,
    /// Ingestion stage settings.
    #[serde(default)]
    pub ingestion: IngestionConfig,
    /// Validation stage settings.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Transformation stage settings.
    #[serde(default)]
    pub transformation: TransformationConfig,
    /// Training stage settings.
    #[serde(default)]
    pub training: TrainingConfig,
    /// Promotion decision settings.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Registry settings.
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Batch prediction settings.
    #[serde(default)]
    pub prediction: PredictionConfig,
}

fn default_artifact_root() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_target() -> String {
    "class".to_string()
}

fn default_positive_label() -> String {
    "pos".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifact_root: default_artifact_root(),
            target: default_target(),
            positive_label: default_positive_label(),
            ingestion: IngestionConfig::default(),
            validation: ValidationConfig::default(),
            transformation: TransformationConfig::default(),
            training: TrainingConfig::default(),
            evaluation: EvaluationConfig::default(),
            registry: RegistryConfig::default(),
            prediction: PredictionConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Creates a pipeline configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the per-run artifact root.
    #[must_use]
    pub fn with_artifact_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.artifact_root = root.into();
        self
    }

    /// Sets the target column name.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Sets the registry configuration.
    #[must_use]
    pub fn with_registry(mut self, registry: RegistryConfig) -> Self {
        self.registry = registry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.root, PathBuf::from("saved_models"));
        assert_eq!(config.model_file, "model.bin");
        assert_eq!(config.publish_attempts, 3);
    }

    #[test]
    fn test_builders() {
        let config = RegistryConfig::new()
            .with_root("/tmp/registry")
            .with_publish_attempts(5);
        assert_eq!(config.root, PathBuf::from("/tmp/registry"));
        assert_eq!(config.publish_attempts, 5);
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"target": "fault"}"#).unwrap();
        assert_eq!(config.target, "fault");
        assert_eq!(config.positive_label, "pos");
        assert!((config.evaluation.min_improvement - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.ingestion.seed, 42);
    }
}
