//! Data ingestion: fetch the raw dataset, persist it, split train/test.

use super::artifact::DataIngestionArtifact;
use super::{FEATURE_STORE_FILE, TEST_FILE, TRAINING_FILE};
use crate::config::IngestionConfig;
use crate::dataset::Table;
use crate::errors::PipelineError;
use std::path::{Path, PathBuf};
use tracing::info;

/// Source of the raw sensor dataset.
///
/// The production deployment reads from a document store; that client stays
/// outside this crate and plugs in through this seam.
pub trait DataSource {
    /// Fetches the complete raw dataset as a table.
    fn fetch_raw_dataset(&self) -> Result<Table, PipelineError>;
}

/// A data source backed by a CSV file on disk.
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
}

impl CsvDataSource {
    /// Creates a source reading from the given file.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for CsvDataSource {
    fn fetch_raw_dataset(&self) -> Result<Table, PipelineError> {
        Ok(Table::from_csv_path(&self.path)?)
    }
}

/// The data ingestion stage.
pub struct DataIngestion<'a> {
    source: &'a dyn DataSource,
    config: &'a IngestionConfig,
    stage_dir: PathBuf,
}

impl std::fmt::Debug for DataIngestion<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataIngestion")
            .field("config", &self.config)
            .field("stage_dir", &self.stage_dir)
            .finish_non_exhaustive()
    }
}

impl<'a> DataIngestion<'a> {
    /// Creates the stage under the given run directory.
    #[must_use]
    pub fn new(source: &'a dyn DataSource, config: &'a IngestionConfig, run_dir: &Path) -> Self {
        Self {
            source,
            config,
            stage_dir: run_dir.join("data_ingestion"),
        }
    }

    /// Fetches the dataset, persists the feature store and both splits.
    pub fn run(&self) -> Result<DataIngestionArtifact, PipelineError> {
        info!("fetching the raw sensor dataset");
        let table = self.source.fetch_raw_dataset()?;
        info!(rows = table.n_rows(), columns = table.n_cols(), "dataset fetched");

        let feature_store_path = self.stage_dir.join(FEATURE_STORE_FILE);
        table.to_csv_path(&feature_store_path)?;

        let (training, test) = table.train_test_split(self.config.test_fraction, self.config.seed);
        info!(
            training_rows = training.n_rows(),
            test_rows = test.n_rows(),
            "split into training and test subsets"
        );

        let training_path = self.stage_dir.join(TRAINING_FILE);
        training.to_csv_path(&training_path)?;
        let test_path = self.stage_dir.join(TEST_FILE);
        test.to_csv_path(&test_path)?;

        Ok(DataIngestionArtifact {
            feature_store_path,
            training_path,
            test_path,
        })
    }
}
