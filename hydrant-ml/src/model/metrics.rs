//! Classification evaluation metrics.

use serde::{Deserialize, Serialize};

/// Accuracy plus confusion counts, persisted as the metrics artifact.
///
/// The count fields follow the actual-by-predicted confusion matrix in
/// class order [0, 1]: `true_positive` is cell [0][0], `true_negative`
/// [1][1], `false_positive` [0][1], `false_negative` [1][0].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub true_positive: usize,
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
}

/// Compare predicted against actual 0/1 labels.
///
/// Accuracy is rounded to two decimals. Slices must be equal length; the
/// shorter length wins otherwise.
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> EvaluationMetrics {
    let mut matrix = [[0usize; 2]; 2];
    let mut correct = 0usize;
    let mut total = 0usize;

    for (a, p) in actual.iter().zip(predicted.iter()) {
        let ai = usize::from(*a != 0.0);
        let pi = usize::from(*p != 0.0);
        matrix[ai][pi] += 1;
        if ai == pi {
            correct += 1;
        }
        total += 1;
    }

    let accuracy = if total == 0 {
        0.0
    } else {
        ((correct as f64 / total as f64) * 100.0).round() / 100.0
    };

    EvaluationMetrics {
        accuracy,
        true_positive: matrix[0][0],
        true_negative: matrix[1][1],
        false_positive: matrix[0][1],
        false_negative: matrix[1][0],
    }
}
