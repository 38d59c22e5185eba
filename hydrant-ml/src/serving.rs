//! Serving-time validation and single-record prediction.
//!
//! One inbound operation: submit a record of feature -> value pairs and
//! receive a potability label or a structured rejection. Validation is
//! stateless across requests; the service loads the range schema, the
//! fitted scaler, and the trained model once at open time.

use crate::config::PipelineConfig;
use crate::data::{RangeSchema, SchemaStore};
use crate::error::MlError;
use crate::features::FittedScaler;
use crate::model::{GbdtBackend, ModelBackend};
use hydrant_core::persistence::{ArtifactCodec, BinaryCodec};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single record submitted for inference.
///
/// Field order is submission order; validation walks it front to back and
/// short-circuits on the first failing field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionRequest {
    fields: IndexMap<String, String>,
}

impl PredictionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field (builder style).
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Parse a JSON object of feature -> value. Values may be JSON numbers
    /// or strings; both arrive as raw text for range validation.
    pub fn from_json(input: &str) -> Result<Self, MlError> {
        let object: IndexMap<String, serde_json::Value> = serde_json::from_str(input)?;
        let mut fields = IndexMap::with_capacity(object.len());
        for (name, value) in object {
            let raw = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                other => {
                    return Err(MlError::dataset(format!(
                        "field '{name}' must be a number or string, got {other}"
                    )));
                }
            };
            fields.insert(name, raw);
        }
        Ok(Self { fields })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Serving-time gatekeeper: every submitted field must be a known feature
/// with a value inside the recorded [min, max].
#[derive(Debug)]
pub struct InferenceValidator {
    schema: RangeSchema,
}

impl InferenceValidator {
    pub fn new(schema: RangeSchema) -> Self {
        Self { schema }
    }

    /// Check every field in submission order, stopping at the first
    /// failure. Values are never coerced into range.
    pub fn validate(&self, request: &PredictionRequest) -> Result<(), MlError> {
        for (field, value) in request.iter() {
            let range = self
                .schema
                .range(field)
                .ok_or_else(|| MlError::UnknownFeature {
                    field: field.to_string(),
                })?;

            // a non-numeric value lies outside any numeric range
            let parsed: f64 = value
                .trim()
                .parse()
                .map_err(|_| MlError::OutOfRange {
                    field: field.to_string(),
                    value: value.to_string(),
                })?;
            if !range.contains(parsed) {
                return Err(MlError::OutOfRange {
                    field: field.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// The final potability verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PotabilityLabel {
    Potable,
    NotPotable,
}

impl fmt::Display for PotabilityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PotabilityLabel::Potable => f.write_str("Potable"),
            PotabilityLabel::NotPotable => f.write_str("Not Potable"),
        }
    }
}

/// Validates, scales, and classifies single records.
#[derive(Debug)]
pub struct PredictionService<B: ModelBackend = GbdtBackend> {
    validator: InferenceValidator,
    scaler: FittedScaler,
    model: B::Model,
    backend: B,
}

impl PredictionService<GbdtBackend> {
    /// Load the serving artifacts produced by a completed pipeline run.
    pub fn open(config: &PipelineConfig) -> Result<Self, MlError> {
        let schema = SchemaStore::from_config(&config.schema).load_range_schema()?;
        let scaler = FittedScaler::load(&config.transformation.scaler_path)?;
        let model = BinaryCodec.load(&config.training.model_path)?;
        Ok(Self::with_parts(schema, scaler, model, GbdtBackend))
    }
}

impl<B: ModelBackend> PredictionService<B> {
    pub fn with_parts(
        schema: RangeSchema,
        scaler: FittedScaler,
        model: B::Model,
        backend: B,
    ) -> Self {
        Self {
            validator: InferenceValidator::new(schema),
            scaler,
            model,
            backend,
        }
    }

    /// Classify one record, or reject it.
    ///
    /// The feature vector is built in submission order, scaled with the
    /// train-time parameters, and handed to the model. The model's raw
    /// output is held to the same rejection taxonomy as the input: only
    /// exactly 1 and exactly 0 map to labels.
    pub fn classify(&self, request: &PredictionRequest) -> Result<PotabilityLabel, MlError> {
        self.validator.validate(request)?;

        let mut row = Vec::with_capacity(request.fields.len());
        for (field, value) in request.iter() {
            let parsed: f64 = value.trim().parse().map_err(|_| MlError::OutOfRange {
                field: field.to_string(),
                value: value.to_string(),
            })?;
            row.push(parsed);
        }
        let scaled = self.scaler.transform_row(&row)?;

        let output = self
            .backend
            .predict(&self.model, std::slice::from_ref(&scaled))?
            .first()
            .copied()
            .ok_or_else(|| MlError::training("model returned no prediction"))?;

        tracing::info!(output, "classified a serving request");
        if output == 1.0 {
            Ok(PotabilityLabel::Potable)
        } else if output == 0.0 {
            Ok(PotabilityLabel::NotPotable)
        } else {
            Err(MlError::ModelOutputOutOfRange { output })
        }
    }
}
