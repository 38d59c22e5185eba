//! Feature standardization (z-score scaling).
//!
//! Parameters are fitted once, on the training split only, and reused
//! verbatim for the test split and every future inference row. The last
//! column of a labeled row is the target and is never scaled.

use crate::error::MlError;
use hydrant_core::persistence::{ArtifactCodec, BinaryCodec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Fits standardization parameters on training rows.
pub struct FeatureScaler;

/// Per-feature (mean, scale) pairs learned from the training split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl FeatureScaler {
    /// Compute per-feature mean and population standard deviation over
    /// `rows`, excluding the label column (the last column is reserved as
    /// the target).
    pub fn fit(rows: &[Vec<f64>]) -> Result<FittedScaler, MlError> {
        let first = rows
            .first()
            .ok_or_else(|| MlError::dataset("cannot fit scaler on an empty training set"))?;
        if first.len() < 2 {
            return Err(MlError::dataset(
                "training rows need at least one feature column and the label column",
            ));
        }
        let n_features = first.len() - 1;
        let n = rows.len() as f64;

        let mut mean = vec![0.0; n_features];
        for row in rows {
            if row.len() != n_features + 1 {
                return Err(MlError::FeatureMismatch {
                    expected: n_features + 1,
                    got: row.len(),
                });
            }
            for (j, value) in row[..n_features].iter().enumerate() {
                mean[j] += value;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut scale = vec![0.0; n_features];
        for row in rows {
            for (j, value) in row[..n_features].iter().enumerate() {
                let d = value - mean[j];
                scale[j] += d * d;
            }
        }
        for s in &mut scale {
            *s = (*s / n).sqrt();
            // constant features pass through unscaled
            if *s == 0.0 {
                *s = 1.0;
            }
        }

        Ok(FittedScaler { mean, scale })
    }
}

impl FittedScaler {
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Apply `(x - mean) / scale` column-wise with the fitted parameters.
    ///
    /// Accepts labeled rows (width = features + 1; the trailing label is
    /// passed through untouched) and bare feature rows (serving); any
    /// other width is a feature-count mismatch.
    pub fn transform(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, MlError> {
        rows.iter().map(|row| self.transform_row(row)).collect()
    }

    /// Scale a single row. See [`FittedScaler::transform`].
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, MlError> {
        let n = self.n_features();
        if row.len() != n && row.len() != n + 1 {
            return Err(MlError::FeatureMismatch {
                expected: n,
                got: row.len(),
            });
        }

        let mut out = Vec::with_capacity(row.len());
        for (j, value) in row.iter().take(n).enumerate() {
            out.push((value - self.mean[j]) / self.scale[j]);
        }
        if row.len() == n + 1 {
            out.push(row[n]);
        }
        Ok(out)
    }

    /// Persist the fitted parameters through the binary codec.
    pub fn persist(&self, path: &Path) -> Result<(), MlError> {
        BinaryCodec.save(path, self)?;
        tracing::info!(path = %path.display(), "persisted fitted scaler");
        Ok(())
    }

    /// Load previously persisted parameters.
    pub fn load(path: &Path) -> Result<Self, MlError> {
        Ok(BinaryCodec.load(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn labeled_rows() -> Vec<Vec<f64>> {
        vec![
            vec![1.0, 10.0, 0.0],
            vec![2.0, 20.0, 1.0],
            vec![3.0, 30.0, 0.0],
            vec![4.0, 40.0, 1.0],
        ]
    }

    #[test]
    fn test_transformed_train_has_zero_mean_unit_std() {
        let rows = labeled_rows();
        let fitted = FeatureScaler::fit(&rows).unwrap();
        let scaled = fitted.transform(&rows).unwrap();

        for j in 0..2 {
            let n = scaled.len() as f64;
            let mean: f64 = scaled.iter().map(|r| r[j]).sum::<f64>() / n;
            let var: f64 = scaled.iter().map(|r| (r[j] - mean).powi(2)).sum::<f64>() / n;
            assert!(mean.abs() < 1e-12, "mean of feature {j} was {mean}");
            assert!((var.sqrt() - 1.0).abs() < 1e-12, "std of feature {j}");
        }
    }

    #[test]
    fn test_label_column_never_scaled() {
        let rows = labeled_rows();
        let fitted = FeatureScaler::fit(&rows).unwrap();
        let scaled = fitted.transform(&rows).unwrap();
        let labels: Vec<f64> = scaled.iter().map(|r| r[2]).collect();
        assert_eq!(labels, vec![0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_transform_reuses_training_parameters() {
        let train = labeled_rows();
        let fitted = FeatureScaler::fit(&train).unwrap();

        // a different set must be scaled with the train-time parameters,
        // not refitted
        let other = vec![vec![10.0, 100.0, 1.0]];
        let scaled = fitted.transform(&other).unwrap();
        let expected_first = (10.0 - 2.5) / fitted.scale[0];
        assert_eq!(scaled[0][0], expected_first);
    }

    #[test]
    fn test_bare_feature_row_for_serving() {
        let fitted = FeatureScaler::fit(&labeled_rows()).unwrap();
        let scaled = fitted.transform_row(&[2.5, 25.0]).unwrap();
        assert_eq!(scaled.len(), 2);
        assert!(scaled[0].abs() < 1e-12); // 2.5 is the fitted mean
    }

    #[test]
    fn test_width_mismatch_rejected() {
        let fitted = FeatureScaler::fit(&labeled_rows()).unwrap();
        assert!(matches!(
            fitted.transform_row(&[1.0]),
            Err(MlError::FeatureMismatch { .. })
        ));
        assert!(matches!(
            fitted.transform_row(&[1.0, 2.0, 3.0, 4.0]),
            Err(MlError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_constant_feature_passes_through() {
        let rows = vec![vec![5.0, 1.0, 0.0], vec![5.0, 2.0, 1.0]];
        let fitted = FeatureScaler::fit(&rows).unwrap();
        let scaled = fitted.transform(&rows).unwrap();
        assert_eq!(scaled[0][0], 0.0);
        assert_eq!(scaled[1][0], 0.0);
    }

    #[test]
    fn test_empty_training_set_rejected() {
        assert!(FeatureScaler::fit(&[]).is_err());
    }

    #[test]
    fn test_persist_load_roundtrip_is_identical() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scaler.bin");
        let fitted = FeatureScaler::fit(&labeled_rows()).unwrap();

        fitted.persist(&path).unwrap();
        let loaded = FittedScaler::load(&path).unwrap();
        assert_eq!(loaded, fitted);

        let rows = vec![vec![1.5, 15.0, 1.0]];
        assert_eq!(
            loaded.transform(&rows).unwrap(),
            fitted.transform(&rows).unwrap()
        );
    }
}
