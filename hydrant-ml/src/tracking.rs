//! Experiment tracking.
//!
//! The tracker is constructed from an explicit [`TrackerConfig`]; core
//! logic never reads ambient environment state. Tracking is no-op-safe:
//! the evaluation stage logs a tracker failure and carries on, so a broken
//! registry can never corrupt pipeline state.

use crate::error::MlError;
use crate::model::{EvaluationMetrics, Hyperparameters};
use chrono::{DateTime, Utc};
use hydrant_core::persistence::atomic_write_json;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Experiment tracking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Disable to skip tracking entirely.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Where the run registry is stored.
    #[serde(default = "default_registry_path")]
    pub registry_path: PathBuf,
    /// Experiment name recorded on every run.
    #[serde(default = "default_experiment_name")]
    pub experiment_name: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            registry_path: default_registry_path(),
            experiment_name: default_experiment_name(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_registry_path() -> PathBuf {
    PathBuf::from("artifacts/model_evaluation/runs.json")
}

fn default_experiment_name() -> String {
    "water-potability".to_string()
}

/// Records params, metrics, and the model artifact for one pipeline run.
pub trait ExperimentTracker: Send + Sync {
    fn log(
        &self,
        params: &Hyperparameters,
        metrics: &EvaluationMetrics,
        model_path: &Path,
    ) -> Result<(), MlError>;
}

/// One tracked pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedRun {
    pub id: String,
    pub experiment: String,
    pub params: Hyperparameters,
    pub metrics: EvaluationMetrics,
    pub model_path: PathBuf,
    pub created_at: DateTime<Utc>,
}

/// Registry of all tracked runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunRegistry {
    pub runs: Vec<TrackedRun>,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self { runs: Vec::new() }
    }

    /// Load the registry from a JSON file. A missing file is an empty
    /// registry.
    pub fn load(path: &Path) -> Result<Self, MlError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save the registry to a JSON file (atomic write).
    pub fn save(&self, path: &Path) -> Result<(), MlError> {
        atomic_write_json(path, self)?;
        Ok(())
    }

    pub fn add(&mut self, run: TrackedRun) {
        self.runs.push(run);
    }

    /// Find a run by ID.
    pub fn find(&self, id: &str) -> Option<&TrackedRun> {
        self.runs.iter().find(|r| r.id == id)
    }
}

/// Tracker that appends runs to a local JSON registry.
pub struct RunRegistryTracker {
    config: TrackerConfig,
}

impl RunRegistryTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }
}

impl ExperimentTracker for RunRegistryTracker {
    fn log(
        &self,
        params: &Hyperparameters,
        metrics: &EvaluationMetrics,
        model_path: &Path,
    ) -> Result<(), MlError> {
        let mut registry = RunRegistry::load(&self.config.registry_path)?;
        let run = TrackedRun {
            id: uuid::Uuid::new_v4().to_string(),
            experiment: self.config.experiment_name.clone(),
            params: params.clone(),
            metrics: metrics.clone(),
            model_path: model_path.to_path_buf(),
            created_at: Utc::now(),
        };
        tracing::info!(
            run_id = %run.id,
            experiment = %run.experiment,
            accuracy = metrics.accuracy,
            "logged tracked run"
        );
        registry.add(run);
        registry.save(&self.config.registry_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn metrics() -> EvaluationMetrics {
        EvaluationMetrics {
            accuracy: 0.9,
            true_positive: 9,
            true_negative: 9,
            false_positive: 1,
            false_negative: 1,
        }
    }

    #[test]
    fn test_log_appends_to_registry() {
        let dir = TempDir::new().unwrap();
        let config = TrackerConfig {
            enabled: true,
            registry_path: dir.path().join("runs.json"),
            experiment_name: "test".into(),
        };
        let tracker = RunRegistryTracker::new(config.clone());

        let params = Hyperparameters::default();
        tracker
            .log(&params, &metrics(), Path::new("model.bin"))
            .unwrap();
        tracker
            .log(&params, &metrics(), Path::new("model.bin"))
            .unwrap();

        let registry = RunRegistry::load(&config.registry_path).unwrap();
        assert_eq!(registry.runs.len(), 2);
        assert_eq!(registry.runs[0].experiment, "test");
        assert!(registry.find(&registry.runs[1].id).is_some());
    }

    #[test]
    fn test_missing_registry_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry = RunRegistry::load(&dir.path().join("absent.json")).unwrap();
        assert!(registry.runs.is_empty());
    }
}
