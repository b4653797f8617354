//! # greedy-logit
//!
//! Greedy feature selection and regularization tuning for L2-regularized
//! logistic regression on purely categorical tabular data, built around the
//! Kaggle "Amazon Employee Access" problem.
//!
//! ## Procedure
//!
//! 1. Read the training and test CSV files ([`dataset::loader`]).
//! 2. Append hashed pairwise and triple-wise interaction columns
//!    ([`dataset::interaction`]).
//! 3. One-hot encode every column into its own sparse block
//!    ([`dataset::onehot`]).
//! 4. Grow a feature set greedily, scoring each candidate set by the mean
//!    ROC-AUC over repeated stratified shuffle splits ([`selection`]).
//! 5. Sweep the inverse regularization strength `C` over a log grid
//!    ([`hyperopt`]).
//! 6. Fit on all training rows, predict the test rows and write the
//!    submission ([`pipeline`], [`io`]).
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use greedy_logit::{ConfigBuilder, Pipeline};
//!
//! # fn main() -> greedy_logit::Result<()> {
//! greedy_logit::init();
//!
//! let config = ConfigBuilder::new()
//!     .train_path("data/train.csv")
//!     .test_path("data/test.csv")
//!     .exclude_columns(["ROLE_CODE"])
//!     .seed(25)
//!     .build()?;
//!
//! let summary = Pipeline::new(config)?.run()?;
//! println!("C={} AUC={} features={:?}", summary.best_c, summary.best_auc, summary.selected_names);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using the building blocks
//!
//! The selector and the sweeper take plain closures, so they can be driven by
//! any scoring function:
//!
//! ```rust
//! use greedy_logit::{GreedyFeatureSelector, HyperparameterSweeper, Result};
//!
//! # fn main() -> Result<()> {
//! let scorer = |features: &[usize]| -> Result<f64> {
//!     Ok(match features {
//!         [2] => 0.80,
//!         [5] => 0.75,
//!         [2, 5] => 0.79,
//!         _ => 0.5,
//!     })
//! };
//! let selection = GreedyFeatureSelector::new().select(6, &scorer)?;
//! assert_eq!(selection.selected, vec![2]);
//!
//! let sweep = HyperparameterSweeper::new().sweep(&[2.0, 4.0, 8.0], |c| Ok(if c > 3.0 { 0.85 } else { 0.7 }))?;
//! assert_eq!(sweep.best_c, 8.0);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure: errors, shared types, traits, defaults
pub mod core;

// Configuration management module
pub mod config;

// Loading, interaction expansion and one-hot encoding
pub mod dataset;

// Regularization sweep
pub mod hyperopt;

// Submission and score log output
pub mod io;

// ROC-AUC
pub mod metrics;

// Classifiers
pub mod model;

// Run orchestration
pub mod pipeline;

// Cross-validation and greedy selection
pub mod selection;

// Re-export core functionality for convenience
pub use self::core::{
    constants::*,
    error::{GreedyLogitError, Result},
    traits::*,
    types::*,
};

pub use config::{ConfigBuilder, PipelineConfig};
pub use dataset::{CsvLoader, KeyMap, OneHotEncoder, RawDataset, SparseBinaryMatrix};
pub use hyperopt::{logspace, GridSpec, HyperparameterSweeper, SweepResult};
pub use io::{append_score_line, write_submission};
pub use metrics::roc_auc_score;
pub use model::{LogisticRegression, PositiveClassProbability};
pub use pipeline::{run_seed_sweep, Pipeline, RunSummary};
pub use selection::{
    BlockScorer, CrossValidator, GreedyFeatureSelector, SelectionResult, StratifiedShuffleSplit,
    SubsetScorer,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging.
///
/// Uses `RUST_LOG` when set and the `info` level otherwise. Calling it more
/// than once is harmless.
pub fn init() {
    core::initialize_logging();
}
