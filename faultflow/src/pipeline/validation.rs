//! Data validation: missing-value, schema and drift checks with a YAML report.
//!
//! Validation observes and reports; it never gates the run. The report is an
//! operator-facing artifact, nothing downstream consumes it.

use super::artifact::{DataIngestionArtifact, DataValidationArtifact};
use super::REPORT_FILE;
use crate::config::ValidationConfig;
use crate::dataset::Table;
use crate::errors::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Drift verdict for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDrift {
    /// Column mean over the base dataset.
    pub base_mean: f64,
    /// Column mean over the current split.
    pub current_mean: f64,
    /// Mean shift in base standard deviations.
    pub shift: f64,
    /// Whether the shift exceeds the configured threshold.
    pub drifted: bool,
}

/// Findings for one split validated against the base dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitFindings {
    /// Columns whose missing-value ratio exceeds the threshold.
    pub redundant_columns: Vec<String>,
    /// Base columns absent from the split.
    pub missing_columns: Vec<String>,
    /// Per-column drift verdicts.
    pub drift: BTreeMap<String, ColumnDrift>,
}

/// The validation report persisted as YAML.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Findings for the training split.
    pub training: SplitFindings,
    /// Findings for the test split.
    pub test: SplitFindings,
}

/// The data validation stage.
#[derive(Debug)]
pub struct DataValidation<'a> {
    config: &'a ValidationConfig,
    stage_dir: PathBuf,
}

impl<'a> DataValidation<'a> {
    /// Creates the stage under the given run directory.
    #[must_use]
    pub fn new(config: &'a ValidationConfig, run_dir: &Path) -> Self {
        Self {
            config,
            stage_dir: run_dir.join("data_validation"),
        }
    }

    /// Validates both splits against the ingested feature store.
    pub fn run(
        &self,
        ingestion: &DataIngestionArtifact,
    ) -> Result<DataValidationArtifact, PipelineError> {
        let base = Table::from_csv_path(&ingestion.feature_store_path)?;
        let training = Table::from_csv_path(&ingestion.training_path)?;
        let test = Table::from_csv_path(&ingestion.test_path)?;

        let report = ValidationReport {
            training: self.validate_split(&base, &training, "training"),
            test: self.validate_split(&base, &test, "test"),
        };

        fs::create_dir_all(&self.stage_dir)?;
        let report_path = self.stage_dir.join(REPORT_FILE);
        let file = File::create(&report_path)?;
        serde_yaml::to_writer(file, &report)?;
        info!(report = %report_path.display(), "validation report written");

        Ok(DataValidationArtifact { report_path })
    }

    fn validate_split(&self, base: &Table, current: &Table, split: &str) -> SplitFindings {
        let mut findings = SplitFindings::default();

        for name in current.column_names() {
            let column = current
                .column(name)
                .filter(|col| col.missing_ratio() > self.config.missing_thresh);
            if column.is_some() {
                warn!(split, column = name, "column exceeds the missing-value threshold");
                findings.redundant_columns.push(name.to_string());
            }
        }

        for name in base.column_names() {
            if !current.has_column(name) {
                warn!(split, column = name, "required column is missing");
                findings.missing_columns.push(name.to_string());
            }
        }

        for name in base.column_names() {
            let (Some(base_col), Some(current_col)) = (base.column(name), current.column(name))
            else {
                continue;
            };
            let (Some(base_mean), Some(current_mean)) = (base_col.mean(), current_col.mean())
            else {
                continue;
            };
            let spread = base_col.std_dev().unwrap_or(0.0).max(f64::EPSILON);
            let shift = (current_mean - base_mean).abs() / spread;
            let drifted = shift > self.config.drift_thresh;
            if drifted {
                warn!(split, column = name, shift, "column distribution drifted");
            }
            findings.drift.insert(
                name.to_string(),
                ColumnDrift {
                    base_mean,
                    current_mean,
                    shift,
                    drifted,
                },
            );
        }

        findings
    }
}
