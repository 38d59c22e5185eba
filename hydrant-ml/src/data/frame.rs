//! In-memory dataset frame with CSV read/write.
//!
//! Cells are `serde_json::Value`s parsed from the delimited text: integers,
//! floats, booleans, strings, with empty fields as `Null`. Every dataset
//! state (raw, clean, train, test) is a distinct file on disk; frames are
//! built fresh from a file and written whole, never mutated in place.

use crate::error::MlError;
use hydrant_core::persistence::atomic_write;
use serde_json::Value;
use std::path::Path;

/// An ordered table of labeled rows.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl DataFrame {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Build a frame from a numeric matrix.
    pub fn from_matrix(columns: Vec<String>, matrix: Vec<Vec<f64>>) -> Self {
        let rows = matrix
            .into_iter()
            .map(|row| row.into_iter().map(number_value).collect())
            .collect();
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, index: usize) -> Vec<&Value> {
        self.rows.iter().filter_map(|row| row.get(index)).collect()
    }

    /// Read a delimited file with a required header row.
    pub fn read_csv(path: &Path) -> Result<Self, MlError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| MlError::dataset(format!("failed to read {}: {e}", path.display())))?;
        let mut lines = content.lines();

        let columns: Vec<String> = lines
            .next()
            .ok_or_else(|| MlError::dataset(format!("empty CSV file: {}", path.display())))?
            .split(',')
            .map(|s| s.trim().trim_matches('"').to_string())
            .collect();

        let mut rows = Vec::new();
        for line in lines {
            if line.trim().is_empty() {
                continue;
            }
            let row: Vec<Value> = line.split(',').map(parse_cell).collect();
            if row.len() != columns.len() {
                return Err(MlError::dataset(format!(
                    "row width {} does not match header width {} in {}",
                    row.len(),
                    columns.len(),
                    path.display()
                )));
            }
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    /// Write the frame as a delimited file, atomically.
    pub fn write_csv(&self, path: &Path) -> Result<(), MlError> {
        let mut out = String::new();
        out.push_str(&self.columns.join(","));
        out.push('\n');
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(render_cell).collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        atomic_write(path, out.as_bytes())?;
        Ok(())
    }

    /// Convert every cell to `f64`. Fails on nulls or non-numeric text.
    pub fn to_matrix(&self) -> Result<Vec<Vec<f64>>, MlError> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(|(j, cell)| {
                        cell.as_f64().ok_or_else(|| {
                            MlError::dataset(format!(
                                "non-numeric cell at row {i}, column '{}'",
                                self.columns.get(j).map(String::as_str).unwrap_or("?")
                            ))
                        })
                    })
                    .collect()
            })
            .collect()
    }

    /// Split the frame into a feature matrix and a label vector, dropping
    /// the target column by name.
    pub fn split_features(&self, target: &str) -> Result<(Vec<Vec<f64>>, Vec<f64>), MlError> {
        let target_idx = self
            .column_index(target)
            .ok_or_else(|| MlError::dataset(format!("target column '{target}' not found")))?;
        let matrix = self.to_matrix()?;

        let mut features = Vec::with_capacity(matrix.len());
        let mut labels = Vec::with_capacity(matrix.len());
        for row in matrix {
            let mut feature_row = row;
            labels.push(feature_row.remove(target_idx));
            features.push(feature_row);
        }
        Ok((features, labels))
    }
}

fn parse_cell(raw: &str) -> Value {
    let s = raw.trim().trim_matches('"');
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = s.parse::<f64>() {
        return serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if s == "true" || s == "false" {
        return Value::Bool(s == "true");
    }
    Value::String(s.to_string())
}

fn render_cell(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn number_value(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
