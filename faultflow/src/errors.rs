//! Error types for the faultflow pipeline.
//!
//! "No prior version" is a typed value (`Option`/`RegistryError::NoPriorVersion`),
//! never an implicit `None` escaping a swallowed exception; every other failure
//! is a dedicated variant so the orchestrator can tell infrastructure failures
//! apart from "completed, not promoted".

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the model registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The registry holds no published version yet.
    ///
    /// Expected outcome for a fresh registry; callers branch on it rather
    /// than report it upward.
    #[error("model registry at {root} has no published versions")]
    NoPriorVersion {
        /// The registry root that was inspected.
        root: PathBuf,
    },

    /// The registry contents violate the versioning protocol.
    ///
    /// Raised for non-integer version directory names, missing component
    /// files, and manifest digest mismatches. Never auto-repaired.
    #[error("corrupt model registry at {path}: {reason}")]
    Corrupt {
        /// The offending path.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// A concurrent publish claimed the version slot first.
    ///
    /// The only retryable error in the taxonomy: the loser recomputes the
    /// next version against the now-updated registry and tries again.
    #[error("version {version} was claimed by a concurrent publish")]
    PublishConflict {
        /// The contested version number.
        version: u64,
    },

    /// Every publish attempt lost its version slot to a concurrent writer.
    #[error("publish failed after {attempts} attempts, last contested version {last_version}")]
    PublishRetriesExhausted {
        /// How many slots were contested before giving up.
        attempts: usize,
        /// The last version number that was lost.
        last_version: u64,
    },

    /// A filesystem operation on the registry failed.
    #[error("registry io failure at {path}: {source}")]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl RegistryError {
    /// Creates a corruption error.
    #[must_use]
    pub fn corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Wraps a filesystem error with the path it occurred at.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while loading or saving serialized artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artifact file does not exist.
    #[error("artifact not found at {path}")]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Reading or writing the artifact file failed.
    #[error("artifact io failure at {path}: {source}")]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The artifact bytes could not be decoded.
    #[error("failed to decode artifact at {path}: {source}")]
    Decode {
        /// The path that was read.
        path: PathBuf,
        /// The codec error.
        #[source]
        source: postcard::Error,
    },

    /// The artifact could not be encoded for writing.
    #[error("failed to encode artifact for {path}: {source}")]
    Encode {
        /// The destination path.
        path: PathBuf,
        /// The codec error.
        #[source]
        source: postcard::Error,
    },
}

/// Errors raised while reading or reshaping tabular data.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A referenced column is absent from the table.
    #[error("column '{name}' not found in the dataset")]
    MissingColumn {
        /// The column name.
        name: String,
    },

    /// A column holds text where numeric values are required.
    #[error("column '{name}' is not numeric")]
    NotNumeric {
        /// The column name.
        name: String,
    },

    /// A CSV row has the wrong number of fields.
    #[error("row {row} has {found} fields, expected {expected}")]
    RaggedRow {
        /// 1-based data row index.
        row: usize,
        /// Field count announced by the header.
        expected: usize,
        /// Field count actually present.
        found: usize,
    },

    /// A column being attached does not match the table's row count.
    #[error("column '{name}' has {found} rows, expected {expected}")]
    ColumnLength {
        /// The column name.
        name: String,
        /// The table's row count.
        expected: usize,
        /// The column's row count.
        found: usize,
    },

    /// The file holds no header row.
    #[error("dataset at {path} is empty")]
    Empty {
        /// The file that was read.
        path: PathBuf,
    },

    /// A label cell is missing where ground truth is required.
    #[error("row {row} has no value in target column '{column}'")]
    MissingLabel {
        /// 1-based data row index.
        row: usize,
        /// The target column name.
        column: String,
    },

    /// Reading or writing the dataset file failed.
    #[error("dataset io failure at {path}: {source}")]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by fitted models and encoders.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A label was not part of the encoder's fitted vocabulary.
    #[error("label '{label}' was not seen when the target encoder was fitted")]
    UnknownLabel {
        /// The unseen label.
        label: String,
    },

    /// An encoded class index has no label in the codebook.
    #[error("class index {index} is outside the fitted codebook of {n_classes} classes")]
    UnknownClass {
        /// The out-of-range index.
        index: usize,
        /// Number of fitted classes.
        n_classes: usize,
    },

    /// The input row width does not match the fitted model.
    #[error("expected {expected} features, got {found}")]
    FeatureMismatch {
        /// Fitted feature count.
        expected: usize,
        /// Provided feature count.
        found: usize,
    },

    /// The target column holds more than two classes.
    #[error("the classifier is binary but the target has {n_classes} classes")]
    NonBinaryTarget {
        /// Number of distinct classes observed.
        n_classes: usize,
    },

    /// Fitting was attempted on an empty dataset.
    #[error("cannot fit on an empty dataset")]
    EmptyFit,
}

/// Error raised when the candidate model fails to beat the promotion threshold.
///
/// Fatal to the current run's promotion, but distinct from infrastructure
/// failure: the run is reported as "completed, not promoted", never as crashed.
#[derive(Debug, Clone, Error)]
#[error(
    "candidate model (score {challenger_score:.4}) did not improve on the deployed model \
     (score {champion_score:.4}) by more than {min_improvement}"
)]
pub struct ModelNotImprovedError {
    /// Test-set score of the currently deployed model.
    pub champion_score: f64,
    /// Test-set score of the freshly trained candidate.
    pub challenger_score: f64,
    /// The minimum improvement the candidate had to clear.
    pub min_improvement: f64,
}

/// The top-level error type for pipeline runs.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A registry operation failed.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// An artifact load or save failed.
    #[error("{0}")]
    Artifact(#[from] ArtifactError),

    /// A dataset operation failed.
    #[error("{0}")]
    Dataset(#[from] DatasetError),

    /// A model or encoder operation failed.
    #[error("{0}")]
    Model(#[from] ModelError),

    /// The candidate did not clear the promotion threshold.
    #[error("{0}")]
    NotImproved(#[from] ModelNotImprovedError),

    /// The validation report could not be serialized.
    #[error("validation report error: {0}")]
    Report(#[from] serde_yaml::Error),

    /// A version manifest could not be serialized or parsed.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// IO error outside any narrower category.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Returns true when the run completed but the candidate was not promoted.
    #[must_use]
    pub fn is_not_improved(&self) -> bool {
        matches!(self, Self::NotImproved(_))
    }

    /// Returns true when the failure is the expected empty-registry outcome.
    #[must_use]
    pub fn is_no_prior_version(&self) -> bool {
        matches!(self, Self::Registry(RegistryError::NoPriorVersion { .. }))
    }
}
