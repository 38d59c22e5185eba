//! Gradient-boosted decision stumps for binary classification.
//!
//! Logistic loss, Newton-step leaf values, one depth-1 tree per boosting
//! iteration. Candidate split thresholds are the midpoints between
//! consecutive distinct feature values, subsampled deterministically from
//! the configured seed when a column has many distinct values.

use crate::error::MlError;
use crate::model::{Hyperparameters, ModelBackend};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// L2 regularization on leaf weights.
const LAMBDA: f64 = 1.0;
/// Cap on candidate thresholds per feature.
const MAX_THRESHOLDS: usize = 32;

/// One depth-1 regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Stump {
    feature: usize,
    threshold: f64,
    left_value: f64,
    right_value: f64,
}

impl Stump {
    fn value(&self, row: &[f64]) -> f64 {
        if row[self.feature] <= self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

/// A trained boosted-stumps classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GbdtModel {
    n_features: usize,
    init_score: f64,
    learning_rate: f64,
    stumps: Vec<Stump>,
}

impl GbdtModel {
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    fn score(&self, row: &[f64]) -> f64 {
        let mut s = self.init_score;
        for stump in &self.stumps {
            s += self.learning_rate * stump.value(row);
        }
        s
    }

    /// Class label (0.0 or 1.0) for one feature row.
    pub fn predict_row(&self, row: &[f64]) -> Result<f64, MlError> {
        if row.len() != self.n_features {
            return Err(MlError::FeatureMismatch {
                expected: self.n_features,
                got: row.len(),
            });
        }
        Ok(if sigmoid(self.score(row)) >= 0.5 { 1.0 } else { 0.0 })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// The boosted-stumps model backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct GbdtBackend;

impl ModelBackend for GbdtBackend {
    type Model = GbdtModel;

    fn fit(
        &self,
        features: &[Vec<f64>],
        labels: &[f64],
        params: &Hyperparameters,
    ) -> Result<GbdtModel, MlError> {
        if features.is_empty() {
            return Err(MlError::training("cannot train on an empty feature matrix"));
        }
        if features.len() != labels.len() {
            return Err(MlError::training(format!(
                "feature rows ({}) and labels ({}) differ in length",
                features.len(),
                labels.len()
            )));
        }
        let n_features = features[0].len();
        if n_features == 0 {
            return Err(MlError::training("feature rows are empty"));
        }
        for row in features {
            if row.len() != n_features {
                return Err(MlError::FeatureMismatch {
                    expected: n_features,
                    got: row.len(),
                });
            }
        }
        if labels.iter().any(|y| *y != 0.0 && *y != 1.0) {
            return Err(MlError::training("labels must be 0 or 1"));
        }

        let n = labels.len() as f64;
        let prior = (labels.iter().sum::<f64>() / n).clamp(1e-6, 1.0 - 1e-6);
        let init_score = (prior / (1.0 - prior)).ln();

        let mut rng = StdRng::seed_from_u64(params.random_seed);
        let candidates: Vec<Vec<f64>> = (0..n_features)
            .map(|j| candidate_thresholds(features, j, &mut rng))
            .collect();

        let mut scores = vec![init_score; labels.len()];
        let mut stumps = Vec::with_capacity(params.iterations);

        for _ in 0..params.iterations {
            let mut grad = Vec::with_capacity(labels.len());
            let mut hess = Vec::with_capacity(labels.len());
            for (score, y) in scores.iter().zip(labels.iter()) {
                let p = sigmoid(*score);
                grad.push(y - p);
                hess.push(p * (1.0 - p));
            }

            let Some(stump) = best_stump(features, &grad, &hess, &candidates) else {
                break;
            };
            for (score, row) in scores.iter_mut().zip(features.iter()) {
                *score += params.learning_rate * stump.value(row);
            }
            stumps.push(stump);
        }

        tracing::info!(
            iterations = stumps.len(),
            n_features,
            "trained boosted-stumps classifier"
        );
        Ok(GbdtModel {
            n_features,
            init_score,
            learning_rate: params.learning_rate,
            stumps,
        })
    }

    fn predict(&self, model: &GbdtModel, features: &[Vec<f64>]) -> Result<Vec<f64>, MlError> {
        features.iter().map(|row| model.predict_row(row)).collect()
    }
}

fn candidate_thresholds(features: &[Vec<f64>], j: usize, rng: &mut StdRng) -> Vec<f64> {
    let mut values: Vec<f64> = features.iter().map(|r| r[j]).collect();
    values.sort_by(f64::total_cmp);
    values.dedup();
    if values.len() < 2 {
        return Vec::new();
    }

    let mut cuts: Vec<f64> = values.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
    if cuts.len() > MAX_THRESHOLDS {
        cuts.shuffle(rng);
        cuts.truncate(MAX_THRESHOLDS);
        cuts.sort_by(f64::total_cmp);
    }
    cuts
}

fn best_stump(
    features: &[Vec<f64>],
    grad: &[f64],
    hess: &[f64],
    candidates: &[Vec<f64>],
) -> Option<Stump> {
    let mut best: Option<(f64, Stump)> = None;

    for (j, cuts) in candidates.iter().enumerate() {
        for &threshold in cuts {
            let (mut gl, mut hl, mut gr, mut hr) = (0.0, 0.0, 0.0, 0.0);
            for (i, row) in features.iter().enumerate() {
                if row[j] <= threshold {
                    gl += grad[i];
                    hl += hess[i];
                } else {
                    gr += grad[i];
                    hr += hess[i];
                }
            }
            let gain = gl * gl / (hl + LAMBDA) + gr * gr / (hr + LAMBDA);
            if best.as_ref().is_none_or(|(g, _)| gain > *g) {
                best = Some((gain, Stump {
                    feature: j,
                    threshold,
                    left_value: gl / (hl + LAMBDA),
                    right_value: gr / (hr + LAMBDA),
                }));
            }
        }
    }

    best.map(|(_, stump)| stump)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn separable_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            let x = i as f64;
            features.push(vec![x, -x]);
            labels.push(f64::from(u8::from(x >= 10.0)));
        }
        (features, labels)
    }

    #[test]
    fn test_fit_separable_data_classifies_training_set() {
        let (features, labels) = separable_data();
        let params = Hyperparameters::default();
        let model = GbdtBackend.fit(&features, &labels, &params).unwrap();
        let predicted = GbdtBackend.predict(&model, &features).unwrap();
        assert_eq!(predicted, labels);
    }

    #[test]
    fn test_predictions_are_exactly_zero_or_one() {
        let (features, labels) = separable_data();
        let model = GbdtBackend
            .fit(&features, &labels, &Hyperparameters::default())
            .unwrap();
        for p in GbdtBackend.predict(&model, &features).unwrap() {
            assert!(p == 0.0 || p == 1.0);
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let (features, labels) = separable_data();
        let params = Hyperparameters::default();
        let a = GbdtBackend.fit(&features, &labels, &params).unwrap();
        let b = GbdtBackend.fit(&features, &labels, &params).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let (features, labels) = separable_data();
        let model = GbdtBackend
            .fit(&features, &labels, &Hyperparameters::default())
            .unwrap();
        assert!(matches!(
            model.predict_row(&[1.0]),
            Err(MlError::FeatureMismatch { .. })
        ));
    }

    #[test]
    fn test_non_binary_labels_rejected() {
        let features = vec![vec![1.0], vec![2.0]];
        let labels = vec![0.0, 2.0];
        assert!(
            GbdtBackend
                .fit(&features, &labels, &Hyperparameters::default())
                .is_err()
        );
    }

    #[test]
    fn test_empty_training_set_rejected() {
        assert!(
            GbdtBackend
                .fit(&[], &[], &Hyperparameters::default())
                .is_err()
        );
    }

    #[test]
    fn test_constant_features_fall_back_to_prior() {
        let features = vec![vec![1.0]; 8];
        let labels = vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0];
        let model = GbdtBackend
            .fit(&features, &labels, &Hyperparameters::default())
            .unwrap();
        // no usable split: every prediction is the majority class
        let predicted = GbdtBackend.predict(&model, &features).unwrap();
        assert!(predicted.iter().all(|p| *p == 1.0));
    }
}
