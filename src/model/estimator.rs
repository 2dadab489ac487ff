use serde::{Deserialize, Serialize};

use super::vectorizer::SparseRow;
use crate::error::SiftError;

/// Fitted linear estimator exported by the training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Binary models carry a single coefficient row (sigmoid); otherwise softmax.
    LogisticRegression {
        classes: Vec<i64>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    MultinomialNb {
        classes: Vec<i64>,
        feature_log_prob: Vec<Vec<f64>>,
        class_log_prior: Vec<f64>,
    },
}

/// Predicted class plus the full probability vector, aligned with `classes`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassScores {
    pub class: i64,
    pub probabilities: Vec<f64>,
}

impl Estimator {
    pub fn classes(&self) -> &[i64] {
        match self {
            Estimator::LogisticRegression { classes, .. } => classes,
            Estimator::MultinomialNb { classes, .. } => classes,
        }
    }

    fn weight_rows(&self) -> &[Vec<f64>] {
        match self {
            Estimator::LogisticRegression { coef, .. } => coef,
            Estimator::MultinomialNb {
                feature_log_prob, ..
            } => feature_log_prob,
        }
    }

    pub fn n_features(&self) -> usize {
        self.weight_rows().first().map(Vec::len).unwrap_or(0)
    }

    /// Shape checks; `n_features` must match the paired vectorizer.
    pub fn validate(&self, n_features: usize) -> Result<(), SiftError> {
        let classes = self.classes();
        if classes.len() < 2 {
            return Err(SiftError::Artifact(format!(
                "estimator needs at least two classes, found {}",
                classes.len()
            )));
        }
        let rows = self.weight_rows();
        let (expected_rows, biases) = match self {
            Estimator::LogisticRegression { intercept, .. } if classes.len() == 2 => {
                (1, intercept.len())
            }
            Estimator::LogisticRegression { intercept, .. } => (classes.len(), intercept.len()),
            Estimator::MultinomialNb {
                class_log_prior, ..
            } => (classes.len(), class_log_prior.len()),
        };
        if rows.len() != expected_rows || biases != expected_rows {
            return Err(SiftError::Artifact(format!(
                "estimator has {} weight rows and {} biases, expected {expected_rows}",
                rows.len(),
                biases
            )));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != n_features) {
            return Err(SiftError::ArtifactMismatch {
                vectorizer: n_features,
                model: row.len(),
            });
        }
        Ok(())
    }

    pub fn predict_proba(&self, row: &SparseRow) -> ClassScores {
        let probabilities = match self {
            Estimator::LogisticRegression {
                coef, intercept, ..
            } if coef.len() == 1 => {
                let p = sigmoid(dot(&coef[0], row) + intercept[0]);
                vec![1.0 - p, p]
            }
            Estimator::LogisticRegression {
                coef, intercept, ..
            } => softmax(
                coef.iter()
                    .zip(intercept)
                    .map(|(w, b)| dot(w, row) + b)
                    .collect(),
            ),
            Estimator::MultinomialNb {
                feature_log_prob,
                class_log_prior,
                ..
            } => softmax(
                feature_log_prob
                    .iter()
                    .zip(class_log_prior)
                    .map(|(w, prior)| dot(w, row) + prior)
                    .collect(),
            ),
        };

        // first maximum wins on ties, like argmax
        let best = probabilities
            .iter()
            .enumerate()
            .fold(0, |best, (i, p)| if *p > probabilities[best] { i } else { best });
        ClassScores {
            class: self.classes()[best],
            probabilities,
        }
    }
}

fn dot(weights: &[f64], row: &SparseRow) -> f64 {
    row.iter().map(|(col, v)| weights[*col] * v).sum()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn softmax(scores: Vec<f64>) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}
