//! Combined pipeline: transformer and label codebook fitted jointly.

use crate::dataset::Table;
use crate::errors::{DatasetError, ModelError, PipelineError};
use crate::models::{FittedTransformer, TargetEncoder};
use serde::{Deserialize, Serialize};

/// The single-object pipeline variant.
///
/// Some deployments fold target encoding into the transformation pipeline and
/// ship one fitted object instead of a (transformer, encoder) pair. This type
/// is that variant: it transforms features and encodes labels jointly and is
/// serialized as one artifact with no standalone encoder file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedPipeline {
    transformer: FittedTransformer,
    codebook: TargetEncoder,
}

impl CombinedPipeline {
    /// Fits the pipeline on a table with its target column still attached.
    pub fn fit(
        table: &Table,
        target: &str,
        feature_names: &[String],
        fill_value: f64,
    ) -> Result<Self, PipelineError> {
        let (features, labels) = table.column_split(target)?;
        let transformer = FittedTransformer::fit(&features, feature_names, fill_value)?;
        let codebook = TargetEncoder::fit(&labels);
        Ok(Self {
            transformer,
            codebook,
        })
    }

    /// Builds the combined variant from already-fitted halves.
    #[must_use]
    pub fn from_parts(transformer: FittedTransformer, codebook: TargetEncoder) -> Self {
        Self {
            transformer,
            codebook,
        }
    }

    /// The feature names recorded at fit time.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        self.transformer.feature_names()
    }

    /// The fitted label codebook.
    #[must_use]
    pub fn codebook(&self) -> &TargetEncoder {
        &self.codebook
    }

    /// Transforms feature columns into a row-major matrix.
    pub fn transform_features(&self, table: &Table) -> Result<Vec<Vec<f64>>, DatasetError> {
        self.transformer.transform(table)
    }

    /// Encodes a label column with the jointly fitted codebook.
    pub fn encode_labels(&self, labels: &[String]) -> Result<Vec<usize>, ModelError> {
        self.codebook.encode(labels)
    }

    /// Decodes class indices back to labels.
    pub fn decode_labels(&self, codes: &[usize]) -> Result<Vec<String>, ModelError> {
        self.codebook.decode(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;

    fn table(csv: &str) -> Table {
        Table::from_csv_reader(Cursor::new(csv.to_string()), &PathBuf::from("test.csv")).unwrap()
    }

    #[test]
    fn test_fit_transform_and_encode() {
        let data = table("s1,class\n1.0,neg\n2.0,pos\n3.0,neg\n");
        let names = vec!["s1".to_string()];
        let pipeline = CombinedPipeline::fit(&data, "class", &names, 0.0).unwrap();

        let rows = pipeline.transform_features(&data).unwrap();
        assert_eq!(rows.len(), 3);

        let codes = pipeline
            .encode_labels(&["pos".to_string(), "neg".to_string()])
            .unwrap();
        assert_eq!(codes, vec![1, 0]);
        assert_eq!(
            pipeline.decode_labels(&codes).unwrap(),
            vec!["pos".to_string(), "neg".to_string()]
        );
    }
}
