//! Core trait definitions for greedy-logit.
//!
//! The cross-validation and selection code is written against these traits
//! rather than a concrete model, so any binary classifier over sparse one-hot
//! input can be plugged in.

use crate::core::error::Result;
use crate::core::types::*;
use crate::dataset::sparse::SparseBinaryMatrix;
use ndarray::{Array2, ArrayView1};

use std::fmt::Debug;

/// A binary classifier trained on a sparse binary design matrix.
///
/// Implementors are cloned once per cross-validation split, so `fit` only
/// ever mutates a worker-owned copy.
pub trait BinaryClassifier: Clone + Send + Sync + Debug {
    /// Fit the model to `x` with labels in `{0, 1}`.
    fn fit(&mut self, x: &SparseBinaryMatrix, y: ArrayView1<'_, Label>) -> Result<()>;

    /// Class probabilities, one row per sample, columns `[P(y=0), P(y=1)]`.
    fn predict_proba(&self, x: &SparseBinaryMatrix) -> Result<Array2<Score>>;

    /// Whether `fit` has completed successfully.
    fn is_fitted(&self) -> bool;

    /// Short model name for logging.
    fn name(&self) -> &'static str;
}

/// Models with a single scalar regularization hyperparameter.
pub trait Regularized {
    /// Current value of the hyperparameter.
    fn regularization(&self) -> f64;

    /// Replace the hyperparameter, rejecting invalid values.
    fn set_regularization(&mut self, value: f64) -> Result<()>;
}
