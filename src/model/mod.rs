//! Classifiers and the positive-class probability adapter.

pub mod logistic;

pub use logistic::{sigmoid, LogisticRegression};

use crate::core::error::{GreedyLogitError, Result};
use crate::core::traits::{BinaryClassifier, Regularized};
use crate::core::types::*;
use crate::dataset::sparse::SparseBinaryMatrix;
use ndarray::{Array1, ArrayView1};

/// Wraps a [`BinaryClassifier`] and exposes only `P(y = 1 | x)`.
///
/// This is the score cross-validation ranks when computing ROC-AUC and the
/// value written to submissions.
#[derive(Debug, Clone)]
pub struct PositiveClassProbability<M> {
    model: M,
}

impl<M: BinaryClassifier> PositiveClassProbability<M> {
    /// Wrap a model
    pub fn new(model: M) -> Self {
        PositiveClassProbability { model }
    }

    /// Fit the wrapped model
    pub fn fit(&mut self, x: &SparseBinaryMatrix, y: ArrayView1<'_, Label>) -> Result<()> {
        self.model.fit(x, y)
    }

    /// Probability of the positive class for every row of `x`.
    pub fn predict_probability(&self, x: &SparseBinaryMatrix) -> Result<Array1<Score>> {
        let proba = self.model.predict_proba(x)?;
        if proba.ncols() != 2 {
            return Err(GreedyLogitError::prediction(format!(
                "{} returned {} probability columns, expected 2",
                self.model.name(),
                proba.ncols()
            )));
        }
        Ok(proba.column(1).to_owned())
    }

    /// Borrow the wrapped model
    pub fn inner(&self) -> &M {
        &self.model
    }

    /// Unwrap the model
    pub fn into_inner(self) -> M {
        self.model
    }
}

impl<M: BinaryClassifier + Regularized> PositiveClassProbability<M> {
    /// Set the wrapped model's regularization hyperparameter.
    pub fn set_regularization(&mut self, value: f64) -> Result<()> {
        self.model.set_regularization(value)
    }

    /// Current regularization hyperparameter.
    pub fn regularization(&self) -> f64 {
        self.model.regularization()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_adapter_returns_positive_column() {
        let x = SparseBinaryMatrix::from_rows(2, vec![vec![0], vec![1], vec![0], vec![1]]).unwrap();
        let y = array![1.0, 0.0, 1.0, 0.0];

        let mut adapter = PositiveClassProbability::new(LogisticRegression::new());
        adapter.fit(&x, y.view()).unwrap();

        let p = adapter.predict_probability(&x).unwrap();
        let full = adapter.inner().predict_proba(&x).unwrap();
        assert_eq!(p, full.column(1).to_owned());
        assert!(p[0] > 0.5 && p[1] < 0.5);
    }

    #[test]
    fn test_adapter_regularization_passthrough() {
        let mut adapter = PositiveClassProbability::new(LogisticRegression::new());
        adapter.set_regularization(4.0).unwrap();
        assert_eq!(adapter.regularization(), 4.0);
        assert_eq!(adapter.into_inner().c(), 4.0);
    }
}
