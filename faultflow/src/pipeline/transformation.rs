//! Data transformation: fit the preprocessing objects, transform both splits.

use super::artifact::{
    DataIngestionArtifact, DataTransformationArtifact, TransformedSplit, TransformerArtifact,
};
use super::{ENCODER_FILE, TEST_ARRAY_FILE, TRAINING_ARRAY_FILE, TRANSFORMER_FILE};
use crate::artifacts::save_object;
use crate::config::TransformationConfig;
use crate::dataset::Table;
use crate::errors::PipelineError;
use crate::models::{CombinedPipeline, FittedTransformer, TargetEncoder};
use std::path::{Path, PathBuf};
use tracing::info;

/// The data transformation stage.
///
/// Fits the feature transformer and target encoder on the training split
/// only, then applies them to both splits. Depending on configuration the
/// fitted objects are persisted either as a (transformer, encoder) pair or
/// as one combined pipeline object.
#[derive(Debug)]
pub struct DataTransformation<'a> {
    config: &'a TransformationConfig,
    target: &'a str,
    positive_label: &'a str,
    stage_dir: PathBuf,
}

impl<'a> DataTransformation<'a> {
    /// Creates the stage under the given run directory.
    #[must_use]
    pub fn new(
        config: &'a TransformationConfig,
        target: &'a str,
        positive_label: &'a str,
        run_dir: &Path,
    ) -> Self {
        Self {
            config,
            target,
            positive_label,
            stage_dir: run_dir.join("data_transformation"),
        }
    }

    /// Fits on the training split and transforms both splits.
    pub fn run(
        &self,
        ingestion: &DataIngestionArtifact,
    ) -> Result<DataTransformationArtifact, PipelineError> {
        let training = Table::from_csv_path(&ingestion.training_path)?;
        let test = Table::from_csv_path(&ingestion.test_path)?;
        let feature_names = training.feature_names(self.target);

        let (training_labels, test_labels) = (
            training.column_split(self.target)?.1,
            test.column_split(self.target)?.1,
        );

        let (pipeline, positive_class, x_train, y_train, x_test, y_test) =
            if self.config.combined_pipeline {
                let combined = CombinedPipeline::fit(
                    &training,
                    self.target,
                    &feature_names,
                    self.config.fill_value,
                )?;
                let positive_class = combined.codebook().encode_label(self.positive_label)?;
                let x_train = combined.transform_features(&training)?;
                let y_train = combined.encode_labels(&training_labels)?;
                let x_test = combined.transform_features(&test)?;
                let y_test = combined.encode_labels(&test_labels)?;

                let pipeline_path = self.stage_dir.join("transformer").join(TRANSFORMER_FILE);
                save_object(&pipeline_path, &combined)?;
                info!(path = %pipeline_path.display(), "combined pipeline fitted and saved");
                (
                    TransformerArtifact::Combined { pipeline_path },
                    positive_class,
                    x_train,
                    y_train,
                    x_test,
                    y_test,
                )
            } else {
                let transformer =
                    FittedTransformer::fit(&training, &feature_names, self.config.fill_value)?;
                let encoder = TargetEncoder::fit(&training_labels);
                let positive_class = encoder.encode_label(self.positive_label)?;
                let x_train = transformer.transform(&training)?;
                let y_train = encoder.encode(&training_labels)?;
                let x_test = transformer.transform(&test)?;
                let y_test = encoder.encode(&test_labels)?;

                let transformer_path = self.stage_dir.join("transformer").join(TRANSFORMER_FILE);
                save_object(&transformer_path, &transformer)?;
                let encoder_path = self.stage_dir.join("encoder").join(ENCODER_FILE);
                save_object(&encoder_path, &encoder)?;
                info!(
                    transformer = %transformer_path.display(),
                    encoder = %encoder_path.display(),
                    "transformer and target encoder fitted and saved"
                );
                (
                    TransformerArtifact::Split {
                        transformer_path,
                        encoder_path,
                    },
                    positive_class,
                    x_train,
                    y_train,
                    x_test,
                    y_test,
                )
            };

        let training_array_path = self.stage_dir.join(TRAINING_ARRAY_FILE);
        save_object(
            &training_array_path,
            &TransformedSplit {
                features: x_train,
                labels: y_train,
            },
        )?;
        let test_array_path = self.stage_dir.join(TEST_ARRAY_FILE);
        save_object(
            &test_array_path,
            &TransformedSplit {
                features: x_test,
                labels: y_test,
            },
        )?;

        Ok(DataTransformationArtifact {
            pipeline,
            positive_class,
            training_array_path,
            test_array_path,
        })
    }
}
