//! Pipeline configuration.
//!
//! Every artifact path the stages read or write lives here, with defaults
//! that lay the artifact tree out under `artifacts/` by stage. Loaded from a
//! single YAML document; any subset of fields may be given, the rest fall
//! back to defaults.

use crate::model::Hyperparameters;
use crate::tracking::TrackerConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Root directory for all stage artifacts.
    #[serde(default = "default_artifacts_root")]
    pub artifacts_root: PathBuf,
    /// Data ingestion (download + unzip) configuration.
    #[serde(default)]
    pub ingestion: IngestionConfig,
    /// Data cleaning configuration.
    #[serde(default)]
    pub cleaning: CleaningConfig,
    /// Schema artifact locations.
    #[serde(default)]
    pub schema: SchemaConfig,
    /// Dataset validation configuration.
    #[serde(default)]
    pub validation: ValidationConfig,
    /// Split/scale transformation configuration.
    #[serde(default)]
    pub transformation: TransformationConfig,
    /// Model training configuration.
    #[serde(default)]
    pub training: TrainingConfig,
    /// Model evaluation configuration.
    #[serde(default)]
    pub evaluation: EvaluationConfig,
    /// Batch prediction configuration.
    #[serde(default)]
    pub prediction: PredictionConfig,
    /// Experiment tracking configuration.
    #[serde(default)]
    pub tracking: TrackerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            artifacts_root: default_artifacts_root(),
            ingestion: IngestionConfig::default(),
            cleaning: CleaningConfig::default(),
            schema: SchemaConfig::default(),
            validation: ValidationConfig::default(),
            transformation: TransformationConfig::default(),
            training: TrainingConfig::default(),
            evaluation: EvaluationConfig::default(),
            prediction: PredictionConfig::default(),
            tracking: TrackerConfig::default(),
        }
    }
}

fn default_artifacts_root() -> PathBuf {
    PathBuf::from("artifacts")
}

/// Data ingestion configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// URL of the zipped source dataset.
    #[serde(default = "default_source_url")]
    pub source_url: String,
    /// Where the downloaded archive is stored.
    #[serde(default = "default_zip_path")]
    pub zip_path: PathBuf,
    /// Directory the archive is extracted into.
    #[serde(default = "default_unzip_dir")]
    pub unzip_dir: PathBuf,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            source_url: default_source_url(),
            zip_path: default_zip_path(),
            unzip_dir: default_unzip_dir(),
        }
    }
}

fn default_source_url() -> String {
    "https://github.com/hydrant-ml/datasets/raw/main/water_potability.zip".to_string()
}

fn default_zip_path() -> PathBuf {
    PathBuf::from("artifacts/data_ingestion/water_potability.zip")
}

fn default_unzip_dir() -> PathBuf {
    PathBuf::from("artifacts/data_ingestion")
}

/// Data cleaning configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningConfig {
    /// The extracted, uncleaned dataset.
    #[serde(default = "default_raw_data_path")]
    pub raw_data_path: PathBuf,
    /// Where the cleaned dataset is written.
    #[serde(default = "default_clean_data_path")]
    pub clean_data_path: PathBuf,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            raw_data_path: default_raw_data_path(),
            clean_data_path: default_clean_data_path(),
        }
    }
}

fn default_raw_data_path() -> PathBuf {
    PathBuf::from("artifacts/data_ingestion/water_potability.csv")
}

fn default_clean_data_path() -> PathBuf {
    PathBuf::from("artifacts/data_cleaning/clean_data.csv")
}

/// Schema artifact locations, shared by cleaning, validation, and serving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Column -> expected type document (YAML).
    #[serde(default = "default_type_schema_path")]
    pub type_schema_path: PathBuf,
    /// Column -> {min, max} document (JSON).
    #[serde(default = "default_range_schema_path")]
    pub range_schema_path: PathBuf,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            type_schema_path: default_type_schema_path(),
            range_schema_path: default_range_schema_path(),
        }
    }
}

fn default_type_schema_path() -> PathBuf {
    PathBuf::from("artifacts/data_cleaning/type_schema.yaml")
}

fn default_range_schema_path() -> PathBuf {
    PathBuf::from("artifacts/data_cleaning/range_schema.json")
}

/// Dataset validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// The stage gate artifact written by validation and read by transformation.
    #[serde(default = "default_status_path")]
    pub status_path: PathBuf,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            status_path: default_status_path(),
        }
    }
}

fn default_status_path() -> PathBuf {
    PathBuf::from("artifacts/data_validation/status.txt")
}

/// Split/scale transformation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationConfig {
    /// Fraction of rows held out as the test split (0.0..1.0).
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,
    /// Seed for the shuffle that precedes the split.
    #[serde(default = "default_split_seed")]
    pub split_seed: u64,
    /// Where the scaled training split is written.
    #[serde(default = "default_train_path")]
    pub train_path: PathBuf,
    /// Where the scaled test split is written.
    #[serde(default = "default_test_path")]
    pub test_path: PathBuf,
    /// Where the fitted scaler is persisted.
    #[serde(default = "default_scaler_path")]
    pub scaler_path: PathBuf,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            test_fraction: default_test_fraction(),
            split_seed: default_split_seed(),
            train_path: default_train_path(),
            test_path: default_test_path(),
            scaler_path: default_scaler_path(),
        }
    }
}

fn default_test_fraction() -> f64 {
    0.25
}

fn default_split_seed() -> u64 {
    42
}

fn default_train_path() -> PathBuf {
    PathBuf::from("artifacts/data_transformation/train_set.csv")
}

fn default_test_path() -> PathBuf {
    PathBuf::from("artifacts/data_transformation/test_set.csv")
}

fn default_scaler_path() -> PathBuf {
    PathBuf::from("artifacts/data_transformation/feature_scaler.bin")
}

/// Model training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Name of the label column. It must be the last dataset column.
    #[serde(default = "default_target_column")]
    pub target_column: String,
    /// Where the trained model is persisted.
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    /// Classifier hyperparameters.
    #[serde(default)]
    pub params: Hyperparameters,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: default_target_column(),
            model_path: default_model_path(),
            params: Hyperparameters::default(),
        }
    }
}

fn default_target_column() -> String {
    "Potability".to_string()
}

fn default_model_path() -> PathBuf {
    PathBuf::from("artifacts/model_trainer/model.bin")
}

/// Model evaluation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Where the metrics document is written.
    #[serde(default = "default_metrics_path")]
    pub metrics_path: PathBuf,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            metrics_path: default_metrics_path(),
        }
    }
}

fn default_metrics_path() -> PathBuf {
    PathBuf::from("artifacts/model_evaluation/metrics.json")
}

/// Batch prediction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionConfig {
    /// Where test-split predictions are written.
    #[serde(default = "default_predictions_path")]
    pub predictions_path: PathBuf,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            predictions_path: default_predictions_path(),
        }
    }
}

fn default_predictions_path() -> PathBuf {
    PathBuf::from("artifacts/model_prediction/predictions.csv")
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, crate::error::MlError> {
        use crate::error::MlError;
        let content = std::fs::read_to_string(path)
            .map_err(|e| MlError::config(format!("failed to read {}: {e}", path.display())))?;
        serde_yaml::from_str(&content)
            .map_err(|e| MlError::config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Rebase every relative path onto `base`.
    ///
    /// Used by tests and callers that keep artifacts outside the working
    /// directory; absolute paths are left untouched.
    pub fn rooted(mut self, base: &Path) -> Self {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        rebase(&mut self.artifacts_root);
        rebase(&mut self.ingestion.zip_path);
        rebase(&mut self.ingestion.unzip_dir);
        rebase(&mut self.cleaning.raw_data_path);
        rebase(&mut self.cleaning.clean_data_path);
        rebase(&mut self.schema.type_schema_path);
        rebase(&mut self.schema.range_schema_path);
        rebase(&mut self.validation.status_path);
        rebase(&mut self.transformation.train_path);
        rebase(&mut self.transformation.test_path);
        rebase(&mut self.transformation.scaler_path);
        rebase(&mut self.training.model_path);
        rebase(&mut self.evaluation.metrics_path);
        rebase(&mut self.prediction.predictions_path);
        rebase(&mut self.tracking.registry_path);
        self
    }
}
