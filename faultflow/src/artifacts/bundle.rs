//! The deployable artifact bundle and its two pipeline shapes.

use super::store::{file_digest, load_object, save_object};
use crate::dataset::Table;
use crate::errors::{ArtifactError, PipelineError};
use crate::metrics::Metric;
use crate::models::{CombinedPipeline, FittedTransformer, GradientBooster, TargetEncoder};
use crate::registry::{ComponentRecord, VersionLayout};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which pipeline shape a bundle carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleShape {
    /// Standalone transformer, target encoder and model.
    Split,
    /// Combined transformer+codebook pipeline and model, no encoder file.
    Combined,
}

impl std::fmt::Display for BundleShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Split => write!(f, "split"),
            Self::Combined => write!(f, "combined"),
        }
    }
}

/// One deployable version's worth of fitted objects.
///
/// The registry treats bundles as opaque: it persists and reloads them but
/// never inspects their internals. Scoring always pairs a model with the
/// transformer and encoder it was fitted alongside — label encodings are not
/// stable across registry versions, so components of different bundles must
/// never be mixed.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactBundle {
    /// The three-object variant.
    Split {
        /// Fitted feature transformer.
        transformer: FittedTransformer,
        /// Fitted target encoder.
        encoder: TargetEncoder,
        /// Trained classifier.
        model: GradientBooster,
    },
    /// The single-pipeline variant.
    Combined {
        /// Jointly fitted transformer and codebook.
        pipeline: CombinedPipeline,
        /// Trained classifier.
        model: GradientBooster,
    },
}

impl ArtifactBundle {
    /// The bundle's pipeline shape.
    #[must_use]
    pub fn shape(&self) -> BundleShape {
        match self {
            Self::Split { .. } => BundleShape::Split,
            Self::Combined { .. } => BundleShape::Combined,
        }
    }

    /// Scores the bundle on a labeled test set.
    ///
    /// Features are transformed and ground-truth labels encoded with this
    /// bundle's own fitted objects; the positive class index is resolved
    /// through the same encoder for the same reason.
    pub fn score(
        &self,
        test_set: &Table,
        target: &str,
        positive_label: &str,
        metric: Metric,
    ) -> Result<f64, PipelineError> {
        let (_, labels) = test_set.column_split(target)?;
        match self {
            Self::Split {
                transformer,
                encoder,
                model,
            } => {
                let x = transformer.transform(test_set)?;
                let y_true = encoder.encode(&labels)?;
                let positive = encoder.encode_label(positive_label)?;
                let y_pred = model.predict(&x)?;
                Ok(metric.score(&y_true, &y_pred, positive))
            }
            Self::Combined { pipeline, model } => {
                let x = pipeline.transform_features(test_set)?;
                let y_true = pipeline.encode_labels(&labels)?;
                let positive = pipeline.codebook().encode_label(positive_label)?;
                let y_pred = model.predict(&x)?;
                Ok(metric.score(&y_true, &y_pred, positive))
            }
        }
    }

    /// Predicts decoded labels for an unlabeled input table.
    pub fn predict_labels(&self, input: &Table) -> Result<Vec<String>, PipelineError> {
        match self {
            Self::Split {
                transformer,
                encoder,
                model,
            } => {
                let x = transformer.transform(input)?;
                let codes = model.predict(&x)?;
                Ok(encoder.decode(&codes)?)
            }
            Self::Combined { pipeline, model } => {
                let x = pipeline.transform_features(input)?;
                let codes = model.predict(&x)?;
                Ok(pipeline.decode_labels(&codes)?)
            }
        }
    }

    /// Writes the bundle's components into a version layout.
    ///
    /// Returns one record per written file, with digests, for the manifest.
    pub fn save_components(
        &self,
        layout: &VersionLayout,
    ) -> Result<Vec<ComponentRecord>, ArtifactError> {
        let mut records = Vec::new();
        match self {
            Self::Split {
                transformer,
                encoder,
                model,
            } => {
                save_object(layout.transformer_path(), transformer)?;
                records.push(component_record(layout, &layout.transformer_path())?);
                save_object(layout.encoder_path(), encoder)?;
                records.push(component_record(layout, &layout.encoder_path())?);
                save_object(layout.model_path(), model)?;
                records.push(component_record(layout, &layout.model_path())?);
            }
            Self::Combined { pipeline, model } => {
                save_object(layout.transformer_path(), pipeline)?;
                records.push(component_record(layout, &layout.transformer_path())?);
                save_object(layout.model_path(), model)?;
                records.push(component_record(layout, &layout.model_path())?);
            }
        }
        Ok(records)
    }

    /// Reads a bundle back from a version layout.
    ///
    /// The on-disk discriminator between the two shapes is the presence of
    /// the encoder component.
    pub fn load_components(layout: &VersionLayout) -> Result<Self, ArtifactError> {
        if layout.encoder_path().exists() {
            Ok(Self::Split {
                transformer: load_object(layout.transformer_path())?,
                encoder: load_object(layout.encoder_path())?,
                model: load_object(layout.model_path())?,
            })
        } else {
            Ok(Self::Combined {
                pipeline: load_object(layout.transformer_path())?,
                model: load_object(layout.model_path())?,
            })
        }
    }
}

fn component_record(layout: &VersionLayout, path: &Path) -> Result<ComponentRecord, ArtifactError> {
    let relative = path
        .strip_prefix(layout.dir())
        .unwrap_or(path)
        .display()
        .to_string();
    Ok(ComponentRecord {
        path: relative,
        sha256: file_digest(path)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryConfig;
    use crate::models::{BoosterParams, Stump};
    use std::io::Cursor;
    use std::path::PathBuf;

    fn table(csv: &str) -> Table {
        Table::from_csv_reader(Cursor::new(csv.to_string()), &PathBuf::from("test.csv")).unwrap()
    }

    fn split_bundle() -> ArtifactBundle {
        let transformer = FittedTransformer::from_parts(
            vec!["s1".to_string()],
            0.0,
            vec![0.0],
            vec![1.0],
        );
        let encoder = TargetEncoder::from_classes(vec!["neg".to_string(), "pos".to_string()]);
        let model = GradientBooster::from_parts(
            1,
            0.0,
            1.0,
            vec![Stump {
                feature: 0,
                threshold: 0.5,
                left: -10.0,
                right: 10.0,
            }],
        );
        ArtifactBundle::Split {
            transformer,
            encoder,
            model,
        }
    }

    #[test]
    fn test_save_load_split_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let layout = VersionLayout::new(dir.path().join("0"), &RegistryConfig::default());
        let bundle = split_bundle();

        bundle.save_components(&layout).unwrap();
        let back = ArtifactBundle::load_components(&layout).unwrap();
        assert_eq!(back, bundle);
        assert_eq!(back.shape(), BundleShape::Split);
    }

    #[test]
    fn test_save_load_combined_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let layout = VersionLayout::new(dir.path().join("0"), &RegistryConfig::default());

        let data = table("s1,class\n0.0,neg\n1.0,pos\n");
        let pipeline =
            CombinedPipeline::fit(&data, "class", &["s1".to_string()], 0.0).unwrap();
        let x = pipeline.transform_features(&data).unwrap();
        let y = pipeline
            .encode_labels(&["neg".to_string(), "pos".to_string()])
            .unwrap();
        let model = GradientBooster::fit(&x, &y, BoosterParams::default()).unwrap();
        let bundle = ArtifactBundle::Combined { pipeline, model };

        let records = bundle.save_components(&layout).unwrap();
        assert_eq!(records.len(), 2);
        assert!(!layout.encoder_path().exists());

        let back = ArtifactBundle::load_components(&layout).unwrap();
        assert_eq!(back.shape(), BundleShape::Combined);
        assert_eq!(back, bundle);
    }

    #[test]
    fn test_score_uses_own_encoder() {
        let bundle = split_bundle();
        // The stump predicts class 1 ("pos") for s1 > 0.5.
        let test = table("s1,class\n1.0,pos\n-1.0,neg\n1.0,pos\n");
        let score = bundle.score(&test, "class", "pos", Metric::F1).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_predict_labels_decodes() {
        let bundle = split_bundle();
        let input = table("s1\n1.0\n-1.0\n");
        let labels = bundle.predict_labels(&input).unwrap();
        assert_eq!(labels, vec!["pos".to_string(), "neg".to_string()]);
    }

    #[test]
    fn test_component_records_carry_digests() {
        let dir = tempfile::tempdir().unwrap();
        let layout = VersionLayout::new(dir.path().join("3"), &RegistryConfig::default());
        let records = split_bundle().save_components(&layout).unwrap();

        assert_eq!(records.len(), 3);
        for record in &records {
            assert_eq!(record.sha256.len(), 64);
            assert!(layout.dir().join(&record.path).exists());
        }
    }
}
