//! End-to-end pipeline tests over a synthetic water-quality dataset.
//!
//! The ingest stage is network-bound and covered by its own unit tests;
//! these tests start from a raw CSV on disk and drive clean through
//! predict, plus the serving path on the resulting artifacts.

use hydrant_ml::config::PipelineConfig;
use hydrant_ml::data::DataFrame;
use hydrant_ml::error::MlError;
use hydrant_ml::model::GbdtBackend;
use hydrant_ml::pipeline::stages::{
    CleanStage, EvaluateStage, PredictStage, TrainStage, TransformStage, ValidateStage,
};
use hydrant_ml::pipeline::{PipelineOrchestrator, Stage, StageId};
use hydrant_ml::serving::{PotabilityLabel, PredictionRequest, PredictionService};
use hydrant_ml::tracking::RunRegistryTracker;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// 40 complete rows with potability decided by ph >= 7, plus two rows with
/// missing values for the cleaning stage to drop.
fn write_raw_dataset(path: &Path) {
    let mut csv = String::from("ph,Hardness,Solids,Potability\n");
    for i in 0..40 {
        let ph = 4.0 + 0.2 * f64::from(i);
        let hardness = 80.5 + 1.5 * f64::from(i);
        let solids = 10000.25 + 25.0 * f64::from(i);
        let potable = u8::from(ph >= 7.0);
        csv.push_str(&format!("{ph},{hardness},{solids},{potable}\n"));
    }
    csv.push_str("7.0,,15000.5,1\n");
    csv.push_str(",100.5,12000.5,0\n");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, csv).unwrap();
}

fn config_in(dir: &Path) -> PipelineConfig {
    let config = PipelineConfig::default().rooted(dir);
    write_raw_dataset(&config.cleaning.raw_data_path);
    config
}

fn stages_from(config: &Arc<PipelineConfig>, ids: &[StageId]) -> Vec<Box<dyn Stage>> {
    ids.iter()
        .map(|id| -> Box<dyn Stage> {
            match id {
                StageId::Clean => Box::new(CleanStage::new(config.clone())),
                StageId::Validate => Box::new(ValidateStage::new(config.clone())),
                StageId::Transform => Box::new(TransformStage::new(config.clone())),
                StageId::Train => Box::new(TrainStage::new(config.clone(), GbdtBackend)),
                StageId::Evaluate => Box::new(EvaluateStage::new(
                    config.clone(),
                    GbdtBackend,
                    Box::new(RunRegistryTracker::new(config.tracking.clone())),
                )),
                StageId::Predict => Box::new(PredictStage::new(config.clone(), GbdtBackend)),
                StageId::Ingest => unreachable!("ingest is not exercised here"),
            }
        })
        .collect()
}

const FULL_RUN: [StageId; 6] = [
    StageId::Clean,
    StageId::Validate,
    StageId::Transform,
    StageId::Train,
    StageId::Evaluate,
    StageId::Predict,
];

#[tokio::test]
async fn full_run_produces_every_artifact() {
    let dir = TempDir::new().unwrap();
    let config = Arc::new(config_in(dir.path()));

    let summary = PipelineOrchestrator::new(stages_from(&config, &FULL_RUN))
        .run()
        .await
        .unwrap();
    assert_eq!(summary.completed, FULL_RUN.to_vec());

    assert!(config.cleaning.clean_data_path.exists());
    assert!(config.schema.type_schema_path.exists());
    assert!(config.schema.range_schema_path.exists());
    assert!(config.validation.status_path.exists());
    assert!(config.transformation.train_path.exists());
    assert!(config.transformation.test_path.exists());
    assert!(config.transformation.scaler_path.exists());
    assert!(config.training.model_path.exists());
    assert!(config.evaluation.metrics_path.exists());
    assert!(config.prediction.predictions_path.exists());

    // incomplete rows were dropped
    let clean = DataFrame::read_csv(&config.cleaning.clean_data_path).unwrap();
    assert_eq!(clean.row_count(), 40);

    // confusion counts cover the whole test split
    let metrics: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(&config.evaluation.metrics_path).unwrap(),
    )
    .unwrap();
    let accuracy = metrics["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
    let counts: u64 = ["true_positive", "true_negative", "false_positive", "false_negative"]
        .iter()
        .map(|k| metrics[*k].as_u64().unwrap())
        .sum();
    let test = DataFrame::read_csv(&config.transformation.test_path).unwrap();
    assert_eq!(counts as usize, test.row_count());

    // the tracker recorded the run
    let registry = std::fs::read_to_string(&config.tracking.registry_path).unwrap();
    assert!(registry.contains("water-potability"));
}

#[tokio::test]
async fn full_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = Arc::new(config_in(dir.path()));

    PipelineOrchestrator::new(stages_from(&config, &FULL_RUN))
        .run()
        .await
        .unwrap();
    PipelineOrchestrator::new(stages_from(&config, &FULL_RUN))
        .run()
        .await
        .unwrap();
}

#[tokio::test]
async fn renamed_column_aborts_at_the_gate_without_artifacts() {
    let dir = TempDir::new().unwrap();
    let config = Arc::new(config_in(dir.path()));

    // derive schemas from the intact dataset
    PipelineOrchestrator::new(stages_from(&config, &[StageId::Clean]))
        .run()
        .await
        .unwrap();

    // rename a column out from under the schema
    let clean = std::fs::read_to_string(&config.cleaning.clean_data_path).unwrap();
    std::fs::write(
        &config.cleaning.clean_data_path,
        clean.replacen("Hardness", "hardness_renamed", 1),
    )
    .unwrap();

    let err = PipelineOrchestrator::new(stages_from(
        &config,
        &[StageId::Validate, StageId::Transform],
    ))
    .run()
    .await
    .unwrap_err();

    match err {
        MlError::StageFailure { stage, source } => {
            assert_eq!(stage, StageId::Transform);
            assert!(matches!(*source, MlError::GateClosed));
        }
        other => panic!("expected StageFailure, got {other}"),
    }

    // the aborted transform committed nothing
    assert!(!config.transformation.train_path.exists());
    assert!(!config.transformation.test_path.exists());
    assert!(!config.transformation.scaler_path.exists());
}

#[tokio::test]
async fn transform_without_validation_is_a_missing_gate() {
    let dir = TempDir::new().unwrap();
    let config = Arc::new(config_in(dir.path()));

    PipelineOrchestrator::new(stages_from(&config, &[StageId::Clean]))
        .run()
        .await
        .unwrap();

    let err = PipelineOrchestrator::new(stages_from(&config, &[StageId::Transform]))
        .run()
        .await
        .unwrap_err();
    match err {
        MlError::StageFailure { stage, source } => {
            assert_eq!(stage, StageId::Transform);
            assert!(matches!(*source, MlError::GateMissing { .. }));
        }
        other => panic!("expected StageFailure, got {other}"),
    }
}

#[tokio::test]
async fn broken_tracker_does_not_fail_the_evaluate_stage() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(dir.path());
    // a directory at the registry path makes every tracker write fail
    config.tracking.registry_path = dir.path().join("registry_dir");
    std::fs::create_dir_all(&config.tracking.registry_path).unwrap();
    let config = Arc::new(config);

    PipelineOrchestrator::new(stages_from(&config, &FULL_RUN))
        .run()
        .await
        .unwrap();
    assert!(config.evaluation.metrics_path.exists());
}

#[tokio::test]
async fn serving_classifies_and_rejects_against_run_artifacts() {
    let dir = TempDir::new().unwrap();
    let config = Arc::new(config_in(dir.path()));
    PipelineOrchestrator::new(stages_from(&config, &FULL_RUN))
        .run()
        .await
        .unwrap();

    let service = PredictionService::open(&config).unwrap();

    // a clearly potable record, well inside every observed range
    let request = PredictionRequest::new()
        .field("ph", "9.0")
        .field("Hardness", "110.0")
        .field("Solids", "10500.0");
    assert_eq!(service.classify(&request).unwrap(), PotabilityLabel::Potable);

    // a clearly non-potable record
    let request = PredictionRequest::new()
        .field("ph", "4.4")
        .field("Hardness", "85.0")
        .field("Solids", "10100.0");
    assert_eq!(
        service.classify(&request).unwrap(),
        PotabilityLabel::NotPotable
    );

    // out-of-range ph is rejected, not coerced
    let request = PredictionRequest::new()
        .field("ph", "20")
        .field("Hardness", "110.0")
        .field("Solids", "10500.0");
    assert!(matches!(
        service.classify(&request).unwrap_err(),
        MlError::OutOfRange { field, .. } if field == "ph"
    ));

    // an unknown field is rejected before its value is even looked at
    let request = PredictionRequest::new()
        .field("Chloramines", "7.0")
        .field("ph", "9.0");
    assert!(matches!(
        service.classify(&request).unwrap_err(),
        MlError::UnknownFeature { field } if field == "Chloramines"
    ));
}

#[tokio::test]
async fn serving_without_artifacts_is_schema_unavailable() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::default().rooted(dir.path());
    assert!(matches!(
        PredictionService::open(&config).unwrap_err(),
        MlError::SchemaUnavailable { .. }
    ));
}
