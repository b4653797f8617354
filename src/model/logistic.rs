//! L2-regularized logistic regression over sparse binary features.
//!
//! Minimizes the liblinear primal objective
//!
//! ```text
//! 0.5 * (||w||^2 + b^2) + C * sum_i log(1 + exp(-s_i * (w . x_i + b)))
//! ```
//!
//! with `s_i = 2 y_i - 1`. The intercept behaves like an always-on feature
//! and is regularized with the weights. The solver is L-BFGS with Armijo
//! backtracking, started from zero, so a fit is fully deterministic.

use crate::core::constants::{DEFAULT_C, DEFAULT_MAX_ITER, DEFAULT_TOLERANCE, LBFGS_HISTORY};
use crate::core::error::{GreedyLogitError, Result};
use crate::core::traits::{BinaryClassifier, Regularized};
use crate::core::types::*;
use crate::dataset::sparse::SparseBinaryMatrix;
use ndarray::{s, Array1, Array2, ArrayView1};
use std::collections::VecDeque;

const ARMIJO_C1: f64 = 1e-4;
const MAX_BACKTRACKS: usize = 40;
const CURVATURE_EPS: f64 = 1e-10;

/// Numerically stable logistic function.
pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `log(1 + exp(t))` without overflow.
fn softplus(t: f64) -> f64 {
    t.max(0.0) + (-t.abs()).exp().ln_1p()
}

/// Logistic regression classifier.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    /// Inverse regularization strength
    c: f64,
    /// Maximum L-BFGS iterations
    max_iter: usize,
    /// Relative gradient tolerance
    tol: f64,
    /// Whether to fit an intercept
    fit_intercept: bool,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
    n_iter: usize,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    /// Create an unfitted model with `C = 1`.
    pub fn new() -> Self {
        LogisticRegression {
            c: DEFAULT_C,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOLERANCE,
            fit_intercept: true,
            coefficients: None,
            intercept: 0.0,
            n_iter: 0,
        }
    }

    /// Set the inverse regularization strength
    pub fn with_c(mut self, c: f64) -> Result<Self> {
        self.set_regularization(c)?;
        Ok(self)
    }

    /// Set the iteration cap
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter.max(1);
        self
    }

    /// Set the relative gradient tolerance
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Enable or disable the intercept term
    pub fn with_intercept(mut self, fit_intercept: bool) -> Self {
        self.fit_intercept = fit_intercept;
        self
    }

    /// Inverse regularization strength
    pub fn c(&self) -> f64 {
        self.c
    }

    /// Fitted weights, one per input column
    pub fn coefficients(&self) -> Option<ArrayView1<'_, f64>> {
        self.coefficients.as_ref().map(|w| w.view())
    }

    /// Fitted intercept
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Iterations used by the last fit
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Linear scores `w . x + b`.
    pub fn decision_function(&self, x: &SparseBinaryMatrix) -> Result<Array1<f64>> {
        let weights = self
            .coefficients
            .as_ref()
            .ok_or_else(|| GreedyLogitError::prediction("Model is not fitted"))?;
        if x.ncols() != weights.len() {
            return Err(GreedyLogitError::dimension_mismatch(
                format!("{} columns", weights.len()),
                format!("{} columns", x.ncols()),
            ));
        }
        Ok(x.dot(weights.view())? + self.intercept)
    }

    /// Objective value and gradient at `theta = [w; b]`.
    fn objective(
        &self,
        x: &SparseBinaryMatrix,
        y: ArrayView1<'_, Label>,
        theta: &Array1<f64>,
    ) -> Result<(f64, Array1<f64>)> {
        let d = x.ncols();
        let w = theta.slice(s![..d]);
        let b = if self.fit_intercept { theta[d] } else { 0.0 };

        let z = x.dot(w)? + b;
        let mut loss = 0.0;
        let mut residual = Array1::zeros(z.len());
        for ((r, &zi), &yi) in residual.iter_mut().zip(z.iter()).zip(y.iter()) {
            let sign = 2.0 * yi - 1.0;
            loss += softplus(-sign * zi);
            *r = sigmoid(zi) - yi;
        }

        let value = 0.5 * theta.dot(theta) + self.c * loss;

        let mut grad = theta.clone();
        let data_grad = x.transpose_dot(residual.view())?;
        grad.slice_mut(s![..d]).scaled_add(self.c, &data_grad);
        if self.fit_intercept {
            grad[d] += self.c * residual.sum();
        }

        Ok((value, grad))
    }

    fn validate_training_input(&self, x: &SparseBinaryMatrix, y: ArrayView1<'_, Label>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(GreedyLogitError::dimension_mismatch(
                format!("{} labels", x.nrows()),
                format!("{} labels", y.len()),
            ));
        }
        if x.nrows() == 0 {
            return Err(GreedyLogitError::training("Cannot fit on zero rows"));
        }
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(GreedyLogitError::training("Labels must be 0 or 1"));
        }
        Ok(())
    }
}

/// L-BFGS search direction from the stored correction pairs.
fn lbfgs_direction(
    grad: &Array1<f64>,
    history: &VecDeque<(Array1<f64>, Array1<f64>, f64)>,
) -> Array1<f64> {
    let mut q = grad.clone();
    let mut alphas = Vec::with_capacity(history.len());

    for (s, y, rho) in history.iter().rev() {
        let alpha = rho * s.dot(&q);
        q.scaled_add(-alpha, y);
        alphas.push(alpha);
    }

    if let Some((s, y, _)) = history.back() {
        q *= s.dot(y) / y.dot(y);
    }

    for ((s, y, rho), alpha) in history.iter().zip(alphas.iter().rev()) {
        let beta = rho * y.dot(&q);
        q.scaled_add(alpha - beta, s);
    }

    -q
}

fn inf_norm(v: &Array1<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}

impl BinaryClassifier for LogisticRegression {
    fn fit(&mut self, x: &SparseBinaryMatrix, y: ArrayView1<'_, Label>) -> Result<()> {
        self.validate_training_input(x, y)?;

        let d = x.ncols();
        let dim = if self.fit_intercept { d + 1 } else { d };
        let mut theta: Array1<f64> = Array1::zeros(dim);
        let (mut value, mut grad) = self.objective(x, y, &theta)?;
        let threshold = self.tol * inf_norm(&grad).max(1.0);
        let mut history: VecDeque<(Array1<f64>, Array1<f64>, f64)> =
            VecDeque::with_capacity(LBFGS_HISTORY);

        let mut iter = 0;
        while iter < self.max_iter && inf_norm(&grad) > threshold {
            iter += 1;

            let mut direction = lbfgs_direction(&grad, &history);
            let mut slope = grad.dot(&direction);
            if slope >= 0.0 {
                history.clear();
                direction = -&grad;
                slope = grad.dot(&direction);
            }

            // Unit steps are well scaled once curvature pairs exist.
            let mut step = if history.is_empty() {
                1.0 / inf_norm(&grad).max(1.0)
            } else {
                1.0
            };

            let mut accepted = None;
            for _ in 0..MAX_BACKTRACKS {
                let candidate = &theta + &(&direction * step);
                let (new_value, new_grad) = self.objective(x, y, &candidate)?;
                if new_value.is_finite() && new_value <= value + ARMIJO_C1 * step * slope {
                    accepted = Some((candidate, new_value, new_grad));
                    break;
                }
                step *= 0.5;
            }

            let Some((candidate, new_value, new_grad)) = accepted else {
                log::debug!("Line search stalled after {} iterations", iter);
                break;
            };

            let s_k = &candidate - &theta;
            let y_k = &new_grad - &grad;
            let sy = s_k.dot(&y_k);
            if sy > CURVATURE_EPS {
                if history.len() == LBFGS_HISTORY {
                    history.pop_front();
                }
                history.push_back((s_k, y_k, 1.0 / sy));
            }

            let decrease = value - new_value;
            theta = candidate;
            value = new_value;
            grad = new_grad;

            if decrease.abs() <= f64::EPSILON * value.abs().max(1.0) {
                break;
            }
        }

        if !value.is_finite() {
            return Err(GreedyLogitError::numerical("Objective diverged during fit"));
        }
        if iter == self.max_iter && inf_norm(&grad) > threshold {
            log::debug!(
                "L-BFGS hit max_iter={} with gradient norm {:.3e}",
                self.max_iter,
                inf_norm(&grad)
            );
        }

        self.intercept = if self.fit_intercept { theta[d] } else { 0.0 };
        self.coefficients = Some(theta.slice(s![..d]).to_owned());
        self.n_iter = iter;
        Ok(())
    }

    fn predict_proba(&self, x: &SparseBinaryMatrix) -> Result<Array2<Score>> {
        let z = self.decision_function(x)?;
        let mut proba = Array2::zeros((z.len(), 2));
        for (mut row, &zi) in proba.outer_iter_mut().zip(z.iter()) {
            let p = sigmoid(zi);
            row[0] = 1.0 - p;
            row[1] = p;
        }
        Ok(proba)
    }

    fn is_fitted(&self) -> bool {
        self.coefficients.is_some()
    }

    fn name(&self) -> &'static str {
        "logistic_regression"
    }
}

impl Regularized for LogisticRegression {
    fn regularization(&self) -> f64 {
        self.c
    }

    fn set_regularization(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() || value <= 0.0 {
            return Err(GreedyLogitError::invalid_parameter(
                "C",
                value.to_string(),
                "must be a positive finite number",
            ));
        }
        self.c = value;
        Ok(())
    }
}
