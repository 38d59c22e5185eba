//! Error types for the hydrant-ml crate.
//!
//! One `thiserror` enum covers the whole rejection taxonomy: schema and gate
//! availability, serving-time input rejections, the defensive model-output
//! check, and stage failures. Dataset validation failure is deliberately NOT
//! an error variant — it is recorded in the stage gate as `false` and only
//! becomes fatal when the transformation stage reads a closed gate.

use crate::pipeline::StageId;
use hydrant_core::CodecError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pipeline and serving operations.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("schema unavailable at {path}: {reason}")]
    SchemaUnavailable { path: PathBuf, reason: String },

    #[error("stage gate missing at {path}: was the validation stage run?")]
    GateMissing { path: PathBuf },

    #[error("stage gate malformed: {content:?}")]
    GateMalformed { content: String },

    #[error("gate closed: upstream schema validation failed")]
    GateClosed,

    #[error("unknown feature: {field}")]
    UnknownFeature { field: String },

    #[error("value for '{field}' out of range: {value}")]
    OutOfRange { field: String, value: String },

    #[error("model output out of range: {output}")]
    ModelOutputOutOfRange { output: f64 },

    #[error("stage {stage} failed: {source}")]
    StageFailure {
        stage: StageId,
        #[source]
        source: Box<MlError>,
    },

    #[error("dataset error: {0}")]
    Dataset(String),

    #[error("feature count mismatch: expected {expected}, got {got}")]
    FeatureMismatch { expected: usize, got: usize },

    #[error("training error: {0}")]
    Training(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("artifact error: {0}")]
    Codec(#[from] CodecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl MlError {
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    pub fn training(msg: impl Into<String>) -> Self {
        Self::Training(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Wrap a stage's failure with the stage that raised it.
    pub fn stage(stage: StageId, source: MlError) -> Self {
        Self::StageFailure {
            stage,
            source: Box::new(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_out_of_range() {
        let err = MlError::OutOfRange {
            field: "ph".into(),
            value: "15".into(),
        };
        assert_eq!(err.to_string(), "value for 'ph' out of range: 15");
    }

    #[test]
    fn test_display_stage_failure_carries_cause() {
        let err = MlError::stage(StageId::Transform, MlError::GateClosed);
        assert_eq!(
            err.to_string(),
            "stage TRANSFORM failed: gate closed: upstream schema validation failed"
        );
    }

    #[test]
    fn test_display_unknown_feature() {
        let err = MlError::UnknownFeature {
            field: "extra".into(),
        };
        assert_eq!(err.to_string(), "unknown feature: extra");
    }
}
