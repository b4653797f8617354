//! Default values used throughout the pipeline.
//!
//! These mirror the settings the Amazon Employee Access script was tuned with.

/// Number of stratified shuffle splits per cross-validation score.
pub const DEFAULT_CV_SPLITS: usize = 15;

/// Fraction of rows held out in each split.
pub const DEFAULT_CV_TEST_SIZE: f64 = 0.1;

/// Seed used for split generation when none is given.
pub const DEFAULT_SEED: u64 = 25;

/// Worker threads used to evaluate splits.
pub const DEFAULT_N_JOBS: usize = 4;

/// Interaction degrees expanded from the raw columns.
pub const DEFAULT_INTERACTION_DEGREES: [usize; 2] = [2, 3];

/// Inverse regularization strength used during feature selection.
pub const DEFAULT_C: f64 = 1.0;

/// `C` grid: `base^start ..= base^stop` in `num` log-spaced steps.
pub const DEFAULT_C_GRID_START: f64 = 1.0;
/// Upper exponent of the `C` grid.
pub const DEFAULT_C_GRID_STOP: f64 = 4.0;
/// Number of `C` values.
pub const DEFAULT_C_GRID_NUM: usize = 20;
/// Base of the `C` grid.
pub const DEFAULT_C_GRID_BASE: f64 = 2.0;

/// L-BFGS iteration cap.
pub const DEFAULT_MAX_ITER: usize = 200;

/// Relative gradient tolerance for L-BFGS.
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Number of correction pairs kept by L-BFGS.
pub const LBFGS_HISTORY: usize = 10;

/// Name of the label column in the training file.
pub const DEFAULT_LABEL_COLUMN: &str = "ACTION";

/// Name of the id column in the test file.
pub const DEFAULT_ID_COLUMN: &str = "id";

/// Header of the submission file.
pub const SUBMISSION_HEADER: [&str; 2] = ["id", "ACTION"];

/// First and last seed of the default seed sweep.
pub const DEFAULT_SEED_SWEEP: (u64, u64) = (1, 20);
