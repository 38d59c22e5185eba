//! Pipeline orchestration: stage identities, the stage gate, the ordered
//! stage implementations, and the orchestrator that drives them.

pub mod gate;
pub mod orchestrator;
pub mod stages;

pub use gate::StageGate;
pub use orchestrator::{PipelineOrchestrator, RunSummary, Stage};

use serde::{Deserialize, Serialize};
use std::fmt;

/// One named, ordered step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    Ingest,
    Clean,
    Validate,
    Transform,
    Train,
    Evaluate,
    Predict,
}

impl StageId {
    /// Canonical execution order.
    pub const ORDER: [StageId; 7] = [
        StageId::Ingest,
        StageId::Clean,
        StageId::Validate,
        StageId::Transform,
        StageId::Train,
        StageId::Evaluate,
        StageId::Predict,
    ];

    pub fn name(self) -> &'static str {
        match self {
            StageId::Ingest => "INGEST",
            StageId::Clean => "CLEAN",
            StageId::Validate => "VALIDATE",
            StageId::Transform => "TRANSFORM",
            StageId::Train => "TRAIN",
            StageId::Evaluate => "EVALUATE",
            StageId::Predict => "PREDICT",
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_starts_with_ingest_and_ends_with_predict() {
        assert_eq!(StageId::ORDER.first(), Some(&StageId::Ingest));
        assert_eq!(StageId::ORDER.last(), Some(&StageId::Predict));
        assert_eq!(StageId::ORDER.len(), 7);
    }

    #[test]
    fn test_display_uses_stage_banner_names() {
        assert_eq!(StageId::Transform.to_string(), "TRANSFORM");
    }
}
