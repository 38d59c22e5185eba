//! Model backend contract, hyperparameters, and evaluation metrics.
//!
//! The pipeline core depends only on the [`ModelBackend`] contract; the
//! boosted-stumps classifier in [`gbdt`] is the concrete capability behind
//! it.

pub mod gbdt;
pub mod metrics;

pub use gbdt::{GbdtBackend, GbdtModel};
pub use metrics::EvaluationMetrics;

use crate::error::MlError;
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

/// Classifier hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Boosting iterations.
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    /// Shrinkage applied to each boosting step.
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Seed for threshold subsampling.
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            learning_rate: default_learning_rate(),
            random_seed: default_random_seed(),
        }
    }
}

fn default_iterations() -> usize {
    200
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_random_seed() -> u64 {
    42
}

/// An opaque fit/predict/evaluate capability.
///
/// The orchestrator and serving path call through this contract only; the
/// model's internals never leak past `Self::Model`, which is persisted as
/// an opaque binary artifact.
pub trait ModelBackend: Send + Sync {
    type Model: Serialize + DeserializeOwned + Send + Sync;

    /// Train a classifier on a feature matrix and 0/1 labels.
    fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[f64],
        params: &Hyperparameters,
    ) -> Result<Self::Model, MlError>;

    /// Predict a 0/1 class label per feature row.
    fn predict(&self, model: &Self::Model, features: &[Vec<f64>]) -> Result<Vec<f64>, MlError>;

    /// Accuracy and confusion counts of predicted against actual labels.
    fn evaluate(&self, actual: &[f64], predicted: &[f64]) -> EvaluationMetrics {
        metrics::evaluate(actual, predicted)
    }
}
