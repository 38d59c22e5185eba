//! Structural dataset validation against the type schema.

use crate::data::frame::DataFrame;
use crate::data::schema::{ColumnType, TypeSchema};
use crate::error::MlError;
use crate::pipeline::{StageGate, StageId};

/// Compares a dataset's columns and types against the type schema and
/// records the verdict in the stage gate.
pub struct DatasetValidator {
    gate: StageGate,
}

impl DatasetValidator {
    pub fn new(gate: StageGate) -> Self {
        Self { gate }
    }

    /// Validate every dataset column against the schema.
    ///
    /// A column fails when its name is absent from the schema or its
    /// observed type differs from the recorded one; one failing column
    /// fails the whole dataset. A dataset with zero columns is accepted:
    /// the verdict defaults to `true` unless some column produced evidence
    /// of failure. Schema columns missing from the dataset are not
    /// failures.
    ///
    /// The verdict is written through the gate before it is returned, so
    /// downstream stages observe it even when the caller discards it.
    pub fn validate(&self, frame: &DataFrame, schema: &TypeSchema) -> Result<bool, MlError> {
        let mut verdict = true;

        for (idx, column) in frame.columns.iter().enumerate() {
            match schema.expected(column) {
                None => {
                    tracing::warn!(column, "column not present in type schema");
                    verdict = false;
                }
                Some(expected) => {
                    let observed = ColumnType::observe(frame.column_values(idx));
                    if observed != expected {
                        tracing::warn!(
                            column,
                            ?expected,
                            ?observed,
                            "column type does not match schema"
                        );
                        verdict = false;
                    }
                }
            }
        }

        self.gate.write(StageId::Validate, verdict)?;
        tracing::info!(passed = verdict, "dataset validation finished");
        Ok(verdict)
    }
}
