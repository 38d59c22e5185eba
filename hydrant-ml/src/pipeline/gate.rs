//! The stage gate — a persisted boolean checkpoint between stages.
//!
//! One gate artifact exists per pipeline run; a later write overwrites the
//! earlier one wholesale. Consumers poll by reading the artifact at the
//! moment they decide; there is no push notification. A missing or
//! malformed artifact is a fatal configuration error, distinct from a
//! legitimate `false`: absence usually means the validation stage never ran.

use crate::error::MlError;
use crate::pipeline::StageId;
use hydrant_core::persistence::atomic_write;
use std::path::PathBuf;

/// A persisted boolean verdict written by one stage and read by the next.
#[derive(Debug, Clone)]
pub struct StageGate {
    path: PathBuf,
}

impl StageGate {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persist a verdict, recording the stage that produced it.
    pub fn write(&self, stage: StageId, passed: bool) -> Result<(), MlError> {
        let content = format!("{stage} {passed}\n");
        atomic_write(&self.path, content.as_bytes())?;
        tracing::info!(stage = stage.name(), passed, path = %self.path.display(), "wrote stage gate");
        Ok(())
    }

    /// Read the persisted verdict.
    pub fn read(&self) -> Result<bool, MlError> {
        if !self.path.exists() {
            return Err(MlError::GateMissing {
                path: self.path.clone(),
            });
        }
        let content = std::fs::read_to_string(&self.path)?;
        content
            .split_whitespace()
            .last()
            .and_then(|token| token.parse::<bool>().ok())
            .ok_or(MlError::GateMalformed { content })
    }
}
