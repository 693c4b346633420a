//! Batch prediction: apply the registry's current model to an input file.

use crate::config::PredictionConfig;
use crate::dataset::Table;
use crate::errors::PipelineError;
use crate::registry::ModelRegistry;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::info;

/// Applies the latest registry bundle to batch input files.
///
/// Independent of the training pipeline; only reads the registry. Each run
/// produces a fresh timestamp-suffixed predictions file so repeated runs
/// against the same input never clobber each other.
#[derive(Debug)]
pub struct BatchPredictionPipeline {
    registry: ModelRegistry,
    config: PredictionConfig,
}

impl BatchPredictionPipeline {
    /// Creates the pipeline against the given registry.
    #[must_use]
    pub fn new(registry: ModelRegistry, config: PredictionConfig) -> Self {
        Self { registry, config }
    }

    /// Predicts labels for one input CSV and writes the predictions file.
    ///
    /// Fails with `NoPriorVersion` when nothing has been published yet.
    pub fn run(&self, input_path: &Path) -> Result<PathBuf, PipelineError> {
        info!(input = %input_path.display(), "running batch prediction");
        let mut table = Table::from_csv_path(input_path)?;

        let bundle = self.registry.load_latest()?;
        let labels = bundle.predict_labels(&table)?;
        table.push_text_column(self.config.prediction_column.clone(), labels)?;

        let output_path = self.prediction_file_path(input_path);
        table.to_csv_path(&output_path)?;
        info!(output = %output_path.display(), "predictions written");
        Ok(output_path)
    }

    /// Output path for one input file: the input's stem plus a timestamp.
    fn prediction_file_path(&self, input_path: &Path) -> PathBuf {
        let stem = input_path
            .file_stem()
            .map_or_else(|| "predictions".to_string(), |s| s.to_string_lossy().into_owned());
        let timestamp = Utc::now().format("%Y%m%dT%H%M%S");
        self.config
            .output_dir
            .join(format!("{stem}__{timestamp}.csv"))
    }
}
