//! Type and range schemas, and the store that persists them.
//!
//! The type schema (column -> expected type) is derived once from the
//! cleaned dataset and drives structural validation. The range schema
//! (column -> observed [min, max]) is derived from the same dataset's
//! descriptive statistics and drives serving-time bounds checks. Both
//! describe the same column universe at different pipeline stages.

use crate::data::frame::DataFrame;
use crate::error::MlError;
use hydrant_core::persistence::{ArtifactCodec, JsonCodec, atomic_write};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Supported column data types, resolved once at schema load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    #[serde(rename = "float64")]
    Float,
    #[serde(rename = "int64")]
    Integer,
    #[serde(rename = "categorical")]
    Categorical,
}

impl ColumnType {
    /// Infer the type of a column from its non-null values.
    ///
    /// Any float makes the column Float; all-integer columns are Integer;
    /// anything textual (or a column with no observable values) is
    /// Categorical.
    pub fn observe<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut has_int = false;
        let mut has_float = false;
        let mut has_other = false;

        for v in values {
            match v {
                Value::Null => {}
                Value::Number(n) => {
                    if n.is_f64() {
                        has_float = true;
                    } else {
                        has_int = true;
                    }
                }
                _ => has_other = true,
            }
        }

        if has_other {
            ColumnType::Categorical
        } else if has_float {
            ColumnType::Float
        } else if has_int {
            ColumnType::Integer
        } else {
            ColumnType::Categorical
        }
    }
}

/// Column -> expected type contract used for structural validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeSchema {
    pub columns: IndexMap<String, ColumnType>,
    /// The label column; always present in `columns`.
    pub target: String,
}

impl TypeSchema {
    pub fn expected(&self, column: &str) -> Option<ColumnType> {
        self.columns.get(column).copied()
    }
}

/// Observed [min, max] of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnRange {
    pub min: f64,
    pub max: f64,
}

impl ColumnRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Column -> [min, max] contract used for serving-time bounds validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeSchema {
    #[serde(flatten)]
    pub columns: IndexMap<String, ColumnRange>,
}

impl RangeSchema {
    pub fn range(&self, column: &str) -> Option<&ColumnRange> {
        self.columns.get(column)
    }
}

/// Loads and persists the two schema artifacts.
///
/// A missing or unparsable backing artifact is `SchemaUnavailable`; callers
/// must not proceed to validation without a schema.
pub struct SchemaStore {
    type_schema_path: PathBuf,
    range_schema_path: PathBuf,
}

impl SchemaStore {
    pub fn new(type_schema_path: impl Into<PathBuf>, range_schema_path: impl Into<PathBuf>) -> Self {
        Self {
            type_schema_path: type_schema_path.into(),
            range_schema_path: range_schema_path.into(),
        }
    }

    pub fn from_config(config: &crate::config::SchemaConfig) -> Self {
        Self::new(&config.type_schema_path, &config.range_schema_path)
    }

    pub fn load_type_schema(&self) -> Result<TypeSchema, MlError> {
        let content = std::fs::read_to_string(&self.type_schema_path).map_err(|e| {
            MlError::SchemaUnavailable {
                path: self.type_schema_path.clone(),
                reason: e.to_string(),
            }
        })?;
        serde_yaml::from_str(&content).map_err(|e| MlError::SchemaUnavailable {
            path: self.type_schema_path.clone(),
            reason: e.to_string(),
        })
    }

    pub fn load_range_schema(&self) -> Result<RangeSchema, MlError> {
        JsonCodec
            .load(&self.range_schema_path)
            .map_err(|e| MlError::SchemaUnavailable {
                path: self.range_schema_path.clone(),
                reason: e.to_string(),
            })
    }

    /// Infer the column types of a cleaned dataset and persist them.
    pub fn derive_type_schema(
        &self,
        frame: &DataFrame,
        target: &str,
    ) -> Result<TypeSchema, MlError> {
        if frame.column_index(target).is_none() {
            return Err(MlError::dataset(format!(
                "target column '{target}' not present in dataset"
            )));
        }

        let mut columns = IndexMap::new();
        for (idx, name) in frame.columns.iter().enumerate() {
            let dtype = ColumnType::observe(frame.column_values(idx));
            columns.insert(name.clone(), dtype);
        }

        let schema = TypeSchema {
            columns,
            target: target.to_string(),
        };
        let yaml = serde_yaml::to_string(&schema)?;
        atomic_write(&self.type_schema_path, yaml.as_bytes())?;
        tracing::info!(path = %self.type_schema_path.display(), "persisted type schema");
        Ok(schema)
    }

    /// Compute per-column min/max over a cleaned dataset and persist them.
    ///
    /// Covers every numeric column, the label included; non-numeric columns
    /// have no meaningful bounds and are skipped.
    pub fn derive_range_schema(&self, frame: &DataFrame) -> Result<RangeSchema, MlError> {
        let mut columns = IndexMap::new();
        for (idx, name) in frame.columns.iter().enumerate() {
            let mut min = f64::INFINITY;
            let mut max = f64::NEG_INFINITY;
            let mut seen = false;
            for value in frame.column_values(idx) {
                if let Some(v) = value.as_f64() {
                    min = min.min(v);
                    max = max.max(v);
                    seen = true;
                }
            }
            if seen {
                columns.insert(name.clone(), ColumnRange { min, max });
            }
        }

        let schema = RangeSchema { columns };
        JsonCodec.save(&self.range_schema_path, &schema)?;
        tracing::info!(path = %self.range_schema_path.display(), "persisted range schema");
        Ok(schema)
    }
}
