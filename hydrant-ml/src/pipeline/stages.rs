//! The seven standard pipeline stages.
//!
//! Each stage reads its inputs from disk, does its work, and writes its full
//! output atomically; no stage keeps state for the next one beyond the
//! artifacts it persists. Stage structs are thin wrappers around the domain
//! modules they drive.

use crate::config::PipelineConfig;
use crate::data::{ArchiveFetcher, DataFrame, DatasetValidator, SchemaStore, drop_incomplete_rows};
use crate::error::MlError;
use crate::features::FeatureScaler;
use crate::model::ModelBackend;
use crate::pipeline::orchestrator::Stage;
use crate::pipeline::{StageGate, StageId};
use crate::tracking::ExperimentTracker;
use async_trait::async_trait;
use hydrant_core::persistence::{ArtifactCodec, BinaryCodec, JsonCodec};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Download and extract the source dataset archive.
pub struct IngestStage {
    config: Arc<PipelineConfig>,
    fetcher: ArchiveFetcher,
}

impl IngestStage {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self {
            config,
            fetcher: ArchiveFetcher::new(),
        }
    }
}

#[async_trait]
impl Stage for IngestStage {
    fn id(&self) -> StageId {
        StageId::Ingest
    }

    async fn run(&self) -> Result<(), MlError> {
        let ingestion = &self.config.ingestion;
        self.fetcher
            .fetch(&ingestion.source_url, &ingestion.zip_path)
            .await?;
        self.fetcher.extract(&ingestion.zip_path, &ingestion.unzip_dir)
    }
}

/// Drop incomplete rows and derive both schemas from the cleaned frame.
pub struct CleanStage {
    config: Arc<PipelineConfig>,
}

impl CleanStage {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for CleanStage {
    fn id(&self) -> StageId {
        StageId::Clean
    }

    async fn run(&self) -> Result<(), MlError> {
        let raw = DataFrame::read_csv(&self.config.cleaning.raw_data_path)?;
        let clean = drop_incomplete_rows(&raw);
        tracing::info!(
            rows_before = raw.row_count(),
            rows_after = clean.row_count(),
            "cleaned the dataset"
        );
        clean.write_csv(&self.config.cleaning.clean_data_path)?;

        let store = SchemaStore::from_config(&self.config.schema);
        store.derive_type_schema(&clean, &self.config.training.target_column)?;
        store.derive_range_schema(&clean)?;
        Ok(())
    }
}

/// Validate the cleaned dataset against the type schema and record the
/// verdict in the stage gate.
pub struct ValidateStage {
    config: Arc<PipelineConfig>,
}

impl ValidateStage {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for ValidateStage {
    fn id(&self) -> StageId {
        StageId::Validate
    }

    async fn run(&self) -> Result<(), MlError> {
        let frame = DataFrame::read_csv(&self.config.cleaning.clean_data_path)?;
        let schema = SchemaStore::from_config(&self.config.schema).load_type_schema()?;

        let gate = StageGate::new(&self.config.validation.status_path);
        let verdict = DatasetValidator::new(gate).validate(&frame, &schema)?;
        if !verdict {
            // rejection lives in the gate; the transform stage turns it fatal
            tracing::warn!("dataset rejected; gate closed for transformation");
        }
        Ok(())
    }
}

/// Split, scale, and persist the train/test sets — if the gate allows it.
pub struct TransformStage {
    config: Arc<PipelineConfig>,
}

impl TransformStage {
    pub fn new(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Stage for TransformStage {
    fn id(&self) -> StageId {
        StageId::Transform
    }

    async fn run(&self) -> Result<(), MlError> {
        let gate = StageGate::new(&self.config.validation.status_path);
        if !gate.read()? {
            return Err(MlError::GateClosed);
        }

        let frame = DataFrame::read_csv(&self.config.cleaning.clean_data_path)?;
        let transformation = &self.config.transformation;

        let mut matrix = frame.to_matrix()?;
        let mut rng = StdRng::seed_from_u64(transformation.split_seed);
        matrix.shuffle(&mut rng);

        let test_count = (matrix.len() as f64 * transformation.test_fraction).ceil() as usize;
        if test_count == 0 || test_count >= matrix.len() {
            return Err(MlError::dataset(format!(
                "cannot split {} rows with test fraction {}",
                matrix.len(),
                transformation.test_fraction
            )));
        }
        let train: Vec<Vec<f64>> = matrix[test_count..].to_vec();
        let test: Vec<Vec<f64>> = matrix[..test_count].to_vec();
        tracing::info!(
            train_rows = train.len(),
            test_rows = test.len(),
            "split the dataset into train and test sets"
        );

        let fitted = FeatureScaler::fit(&train)?;
        let train_scaled = fitted.transform(&train)?;
        let test_scaled = fitted.transform(&test)?;
        tracing::info!("feature scaled the train and test sets");

        DataFrame::from_matrix(frame.columns.clone(), train_scaled)
            .write_csv(&transformation.train_path)?;
        DataFrame::from_matrix(frame.columns.clone(), test_scaled)
            .write_csv(&transformation.test_path)?;
        fitted.persist(&transformation.scaler_path)?;
        Ok(())
    }
}

/// Fit the classifier on the training split and persist it.
pub struct TrainStage<B: ModelBackend> {
    config: Arc<PipelineConfig>,
    backend: B,
}

impl<B: ModelBackend> TrainStage<B> {
    pub fn new(config: Arc<PipelineConfig>, backend: B) -> Self {
        Self { config, backend }
    }
}

#[async_trait]
impl<B: ModelBackend + 'static> Stage for TrainStage<B> {
    fn id(&self) -> StageId {
        StageId::Train
    }

    async fn run(&self) -> Result<(), MlError> {
        let training = &self.config.training;
        let frame = DataFrame::read_csv(&self.config.transformation.train_path)?;
        let (features, labels) = frame.split_features(&training.target_column)?;

        let model = self.backend.fit(&features, &labels, &training.params)?;
        BinaryCodec.save(&training.model_path, &model)?;
        tracing::info!(path = %training.model_path.display(), "trained and saved the model");
        Ok(())
    }
}

/// Predict on the test split, persist metrics, and log the run to the
/// experiment tracker.
pub struct EvaluateStage<B: ModelBackend> {
    config: Arc<PipelineConfig>,
    backend: B,
    tracker: Box<dyn ExperimentTracker>,
}

impl<B: ModelBackend> EvaluateStage<B> {
    pub fn new(config: Arc<PipelineConfig>, backend: B, tracker: Box<dyn ExperimentTracker>) -> Self {
        Self {
            config,
            backend,
            tracker,
        }
    }
}

#[async_trait]
impl<B: ModelBackend + 'static> Stage for EvaluateStage<B> {
    fn id(&self) -> StageId {
        StageId::Evaluate
    }

    async fn run(&self) -> Result<(), MlError> {
        let training = &self.config.training;
        let frame = DataFrame::read_csv(&self.config.transformation.test_path)?;
        let (features, labels) = frame.split_features(&training.target_column)?;

        let model: B::Model = BinaryCodec.load(&training.model_path)?;
        let predicted = self.backend.predict(&model, &features)?;
        let metrics = self.backend.evaluate(&labels, &predicted);

        JsonCodec.save(&self.config.evaluation.metrics_path, &metrics)?;
        tracing::info!(accuracy = metrics.accuracy, "evaluated the model");

        if self.config.tracking.enabled {
            // tracking must never corrupt pipeline state
            if let Err(e) = self
                .tracker
                .log(&training.params, &metrics, &training.model_path)
            {
                tracing::warn!(error = %e, "experiment tracking failed; continuing");
            }
        }
        Ok(())
    }
}

/// Batch-predict the test split and persist the predictions.
pub struct PredictStage<B: ModelBackend> {
    config: Arc<PipelineConfig>,
    backend: B,
}

impl<B: ModelBackend> PredictStage<B> {
    pub fn new(config: Arc<PipelineConfig>, backend: B) -> Self {
        Self { config, backend }
    }
}

#[async_trait]
impl<B: ModelBackend + 'static> Stage for PredictStage<B> {
    fn id(&self) -> StageId {
        StageId::Predict
    }

    async fn run(&self) -> Result<(), MlError> {
        let training = &self.config.training;
        let frame = DataFrame::read_csv(&self.config.transformation.test_path)?;
        let (features, _) = frame.split_features(&training.target_column)?;

        let model: B::Model = BinaryCodec.load(&training.model_path)?;
        let predicted = self.backend.predict(&model, &features)?;

        let rows: Vec<Vec<f64>> = predicted.into_iter().map(|p| vec![p]).collect();
        let out = DataFrame::from_matrix(vec![training.target_column.clone()], rows);
        out.write_csv(&self.config.prediction.predictions_path)?;
        tracing::info!(
            rows = out.row_count(),
            path = %self.config.prediction.predictions_path.display(),
            "predicted the test set"
        );
        Ok(())
    }
}
