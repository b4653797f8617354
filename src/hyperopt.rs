//! Hyperparameter sweep over the inverse regularization strength `C`.
//!
//! The search space is a fixed logarithmic grid. Every grid value is scored
//! by a caller-supplied closure (usually a cross-validated AUC) and the best
//! one is kept.

use crate::core::constants::{
    DEFAULT_C_GRID_BASE, DEFAULT_C_GRID_NUM, DEFAULT_C_GRID_START, DEFAULT_C_GRID_STOP,
};
use crate::core::error::{GreedyLogitError, Result};
use crate::core::types::*;
use serde::{Deserialize, Serialize};

/// `num` values spaced evenly on a log scale from `base^start` to `base^stop`,
/// both endpoints included.
pub fn logspace(start: f64, stop: f64, num: usize, base: f64) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![base.powf(start)],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            (0..num)
                .map(|i| base.powf(start + step * i as f64))
                .collect()
        }
    }
}

/// Logarithmic grid definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSpec {
    /// Exponent of the first value
    pub start: f64,
    /// Exponent of the last value
    pub stop: f64,
    /// Number of values
    pub num: usize,
    /// Logarithm base
    pub base: f64,
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            start: DEFAULT_C_GRID_START,
            stop: DEFAULT_C_GRID_STOP,
            num: DEFAULT_C_GRID_NUM,
            base: DEFAULT_C_GRID_BASE,
        }
    }
}

impl GridSpec {
    /// Materialize the grid
    pub fn values(&self) -> Vec<f64> {
        logspace(self.start, self.stop, self.num, self.base)
    }

    /// Check that the grid yields at least one positive, finite value.
    pub fn validate(&self) -> Result<()> {
        if self.num == 0 {
            return Err(GreedyLogitError::invalid_parameter(
                "c_grid.num",
                "0",
                "grid must contain at least one value",
            ));
        }
        if !(self.base > 0.0 && self.base.is_finite()) {
            return Err(GreedyLogitError::invalid_parameter(
                "c_grid.base",
                self.base.to_string(),
                "must be positive and finite",
            ));
        }
        if !self.start.is_finite() || !self.stop.is_finite() {
            return Err(GreedyLogitError::invalid_parameter(
                "c_grid",
                format!("[{}, {}]", self.start, self.stop),
                "exponents must be finite",
            ));
        }
        Ok(())
    }
}

/// Outcome of a sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    /// Winning hyperparameter value
    pub best_c: f64,
    /// Its score
    pub best_score: Score,
    /// `(score, C)` for every grid value, in grid order
    pub history: Vec<ScoreEntry<f64>>,
}

/// Exhaustive grid sweeper.
#[derive(Debug, Clone, Copy, Default)]
pub struct HyperparameterSweeper;

impl HyperparameterSweeper {
    /// Create a sweeper
    pub fn new() -> Self {
        HyperparameterSweeper
    }

    /// Score every value of `grid` and return the best one.
    ///
    /// Equal scores resolve to the larger value.
    pub fn sweep<F>(&self, grid: &[f64], mut scorer: F) -> Result<SweepResult>
    where
        F: FnMut(f64) -> Result<Score>,
    {
        if grid.is_empty() {
            return Err(GreedyLogitError::invalid_parameter(
                "grid",
                "[]",
                "hyperparameter grid is empty",
            ));
        }

        let mut history = Vec::with_capacity(grid.len());
        for &c in grid {
            let score = scorer(c)?;
            log::info!("C: {:.6} Mean AUC: {:.6}", c, score);
            history.push(ScoreEntry::new(score, c));
        }

        let best = history
            .iter()
            .copied()
            .reduce(|best, entry| {
                let better = entry.score > best.score
                    || (entry.score == best.score && entry.candidate > best.candidate);
                if better {
                    entry
                } else {
                    best
                }
            })
            .ok_or_else(|| GreedyLogitError::training("hyperparameter sweep produced no scores"))?;

        log::info!("Best C value: {:.6}", best.candidate);

        Ok(SweepResult {
            best_c: best.candidate,
            best_score: best.score,
            history,
        })
    }
}
