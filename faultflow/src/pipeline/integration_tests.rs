//! End-to-end tests for the training and prediction pipelines.

use super::*;
use crate::artifacts::BundleShape;
use crate::config::{PipelineConfig, PredictionConfig, RegistryConfig};
use crate::dataset::Column;
use std::path::Path;

/// Two well-separated clusters: rows below the boundary are "neg", the rest
/// "pos", linearly separable on `s1`.
fn write_sensor_csv(path: &Path) {
    let mut csv = String::from("s1,s2,class\n");
    for i in 0..40 {
        let (s1, class) = if i < 20 {
            (f64::from(i), "neg")
        } else {
            (f64::from(i) + 100.0, "pos")
        };
        csv.push_str(&format!("{s1},{},{class}\n", f64::from(i % 7)));
    }
    std::fs::write(path, csv).unwrap();
}

fn test_config(root: &Path) -> PipelineConfig {
    PipelineConfig {
        artifact_root: root.join("artifacts"),
        registry: RegistryConfig::default().with_root(root.join("saved_models")),
        prediction: PredictionConfig {
            output_dir: root.join("predictions"),
            ..PredictionConfig::default()
        },
        ..PipelineConfig::default()
    }
}

#[test]
fn test_first_run_bootstraps_version_zero() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sensors.csv");
    write_sensor_csv(&input);
    let config = test_config(dir.path());

    let pipeline = TrainingPipeline::new(CsvDataSource::new(&input), config).unwrap();
    let summary = pipeline.run().unwrap();

    match summary.outcome {
        PromotionOutcome::Promoted {
            version,
            evaluation,
        } => {
            assert_eq!(version, 0);
            assert!(evaluation.is_model_replaced);
            assert_eq!(evaluation.improved_metric, None);
        }
        PromotionOutcome::NotPromoted { .. } => panic!("bootstrap run must promote"),
    }

    let registry = pipeline.registry();
    assert_eq!(registry.latest_version().unwrap(), Some(0));
    registry.verify_version(0).unwrap();

    // The run directory holds every stage's artifacts.
    assert!(summary.run_dir.join("data_ingestion").is_dir());
    assert!(summary
        .run_dir
        .join("data_validation")
        .join("report.yaml")
        .is_file());
    assert!(summary.run_dir.join("data_transformation").is_dir());
    assert!(summary.training.model_path.is_file());
}

#[test]
fn test_identical_rerun_is_not_promoted() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sensors.csv");
    write_sensor_csv(&input);
    let config = test_config(dir.path());

    let first = TrainingPipeline::new(CsvDataSource::new(&input), config.clone()).unwrap();
    first.run().unwrap();

    let second = TrainingPipeline::new(CsvDataSource::new(&input), config).unwrap();
    let summary = second.run().unwrap();

    match summary.outcome {
        PromotionOutcome::NotPromoted {
            champion_score,
            challenger_score,
        } => {
            // Identical data and seeds train an identical model; a tie never
            // replaces the deployed version.
            assert!((champion_score - challenger_score).abs() < 1e-12);
        }
        PromotionOutcome::Promoted { .. } => panic!("identical rerun must not promote"),
    }
    assert_eq!(second.registry().latest_version().unwrap(), Some(0));
}

#[test]
fn test_batch_prediction_after_promotion() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sensors.csv");
    write_sensor_csv(&input);
    let config = test_config(dir.path());

    let pipeline = TrainingPipeline::new(CsvDataSource::new(&input), config.clone()).unwrap();
    pipeline.run().unwrap();

    let batch_input = dir.path().join("batch.csv");
    std::fs::write(&batch_input, "s1,s2\n0.0,1.0\n139.0,1.0\n").unwrap();

    let prediction = BatchPredictionPipeline::new(
        ModelRegistry::open(config.registry).unwrap(),
        config.prediction,
    );
    let output = prediction.run(&batch_input).unwrap();

    let table = Table::from_csv_path(&output).unwrap();
    match table.column("prediction").unwrap() {
        Column::Text(values) => {
            assert_eq!(values[0].as_deref(), Some("neg"));
            assert_eq!(values[1].as_deref(), Some("pos"));
        }
        Column::Float(_) => panic!("prediction column should be text"),
    }
}

#[test]
fn test_combined_pipeline_variant_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("sensors.csv");
    write_sensor_csv(&input);
    let mut config = test_config(dir.path());
    config.transformation.combined_pipeline = true;

    let pipeline = TrainingPipeline::new(CsvDataSource::new(&input), config.clone()).unwrap();
    let summary = pipeline.run().unwrap();
    assert!(matches!(
        summary.outcome,
        PromotionOutcome::Promoted { version: 0, .. }
    ));

    let registry = pipeline.registry();
    let manifest = registry.verify_version(0).unwrap();
    assert_eq!(manifest.shape, BundleShape::Combined);
    assert!(!registry.version_layout(0).encoder_path().exists());

    // The combined bundle serves predictions like the split one.
    let batch_input = dir.path().join("batch.csv");
    std::fs::write(&batch_input, "s1,s2\n139.0,1.0\n").unwrap();
    let output = BatchPredictionPipeline::new(
        ModelRegistry::open(config.registry).unwrap(),
        config.prediction,
    )
    .run(&batch_input)
    .unwrap();

    let table = Table::from_csv_path(&output).unwrap();
    match table.column("prediction").unwrap() {
        Column::Text(values) => assert_eq!(values[0].as_deref(), Some("pos")),
        Column::Float(_) => panic!("prediction column should be text"),
    }
}
