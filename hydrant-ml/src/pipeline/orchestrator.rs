//! The pipeline orchestrator.
//!
//! Runs an ordered list of stages strictly sequentially: a stage only runs
//! after every prior stage returned Ok. There is no retry, no skip, and no
//! resume-from-failed-stage; the first failure is logged with its stage and
//! surfaced as `StageFailure`. Re-running from the start is always safe
//! because every stage writes its full output.

use crate::config::PipelineConfig;
use crate::error::MlError;
use crate::model::GbdtBackend;
use crate::pipeline::StageId;
use crate::pipeline::stages::{
    CleanStage, EvaluateStage, IngestStage, PredictStage, TrainStage, TransformStage,
    ValidateStage,
};
use crate::tracking::RunRegistryTracker;
use async_trait::async_trait;
use std::sync::Arc;

/// One runnable pipeline stage.
#[async_trait]
pub trait Stage: Send + Sync {
    fn id(&self) -> StageId;

    async fn run(&self) -> Result<(), MlError>;
}

/// Summary of a completed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: Vec<StageId>,
}

/// Drives the ordered stage sequence.
pub struct PipelineOrchestrator {
    stages: Vec<Box<dyn Stage>>,
}

impl PipelineOrchestrator {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// The standard seven-stage pipeline over the boosted-stumps backend
    /// and the JSON run-registry tracker.
    pub fn standard(config: PipelineConfig) -> Self {
        let config = Arc::new(config);
        let tracker = RunRegistryTracker::new(config.tracking.clone());
        Self::new(vec![
            Box::new(IngestStage::new(config.clone())),
            Box::new(CleanStage::new(config.clone())),
            Box::new(ValidateStage::new(config.clone())),
            Box::new(TransformStage::new(config.clone())),
            Box::new(TrainStage::new(config.clone(), GbdtBackend)),
            Box::new(EvaluateStage::new(
                config.clone(),
                GbdtBackend,
                Box::new(tracker),
            )),
            Box::new(PredictStage::new(config, GbdtBackend)),
        ])
    }

    /// Run every stage in order, stopping at the first failure.
    pub async fn run(&self) -> Result<RunSummary, MlError> {
        let mut completed = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let id = stage.id();
            tracing::info!(stage = id.name(), ">>>>>> stage started <<<<<<");
            match stage.run().await {
                Ok(()) => {
                    tracing::info!(stage = id.name(), ">>>>>> stage completed <<<<<<");
                    completed.push(id);
                }
                Err(cause) => {
                    tracing::error!(stage = id.name(), error = %cause, "stage failed, aborting run");
                    return Err(MlError::stage(id, cause));
                }
            }
        }

        Ok(RunSummary { completed })
    }
}
