//! Repeated stratified shuffle-split cross-validation.
//!
//! Every split holds out the same fraction of each class. Splits are drawn
//! up front from a single seeded generator, then fitted and scored in
//! parallel on a bounded worker pool. Per-split scores are gathered in split
//! order, so the mean never depends on which worker finishes first.

use crate::core::constants::{DEFAULT_CV_SPLITS, DEFAULT_CV_TEST_SIZE, DEFAULT_N_JOBS, DEFAULT_SEED};
use crate::core::error::{GreedyLogitError, Result};
use crate::core::traits::BinaryClassifier;
use crate::core::types::*;
use crate::dataset::sparse::SparseBinaryMatrix;
use crate::metrics::roc_auc_score;
use crate::model::PositiveClassProbability;
use ndarray::{ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;

/// Row indices of one train/test split, both sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    /// Rows used for fitting
    pub train: Vec<usize>,
    /// Rows used for scoring
    pub test: Vec<usize>,
}

/// Randomized stratified train/test splitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StratifiedShuffleSplit {
    /// Number of independent splits
    pub n_splits: usize,
    /// Fraction of rows held out, in (0, 1)
    pub test_size: f64,
    /// Generator seed
    pub seed: u64,
}

impl Default for StratifiedShuffleSplit {
    fn default() -> Self {
        StratifiedShuffleSplit {
            n_splits: DEFAULT_CV_SPLITS,
            test_size: DEFAULT_CV_TEST_SIZE,
            seed: DEFAULT_SEED,
        }
    }
}

impl StratifiedShuffleSplit {
    /// Create a splitter
    pub fn new(n_splits: usize, test_size: f64, seed: u64) -> Result<Self> {
        if n_splits == 0 {
            return Err(GreedyLogitError::invalid_parameter(
                "n_splits",
                "0",
                "must be at least 1",
            ));
        }
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(GreedyLogitError::invalid_parameter(
                "test_size",
                test_size.to_string(),
                "must be in (0, 1)",
            ));
        }
        Ok(StratifiedShuffleSplit {
            n_splits,
            test_size,
            seed,
        })
    }

    /// Generate `n_splits` splits for binary labels `y`.
    pub fn split(&self, y: ArrayView1<'_, Label>) -> Result<Vec<Split>> {
        let classes: Vec<Vec<usize>> = [0.0, 1.0]
            .iter()
            .map(|&class| {
                y.iter()
                    .enumerate()
                    .filter(|&(_, &v)| v == class)
                    .map(|(i, _)| i)
                    .collect::<Vec<usize>>()
            })
            .filter(|members| !members.is_empty())
            .collect();

        let n = y.len();
        let n_classes = classes.len();
        if n_classes < 2 {
            return Err(GreedyLogitError::dataset(
                "Stratified splitting needs both classes in the labels",
            ));
        }

        let n_test = ((self.test_size * n as f64).ceil() as usize).max(n_classes);
        if n_test > n || n - n_test < n_classes {
            return Err(GreedyLogitError::dataset(format!(
                "{} rows are too few for a stratified split with {} test rows",
                n, n_test
            )));
        }

        let counts: Vec<usize> = classes.iter().map(Vec::len).collect();
        let test_alloc = allocate_test_rows(&counts, n_test);

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut splits = Vec::with_capacity(self.n_splits);
        for _ in 0..self.n_splits {
            let mut train = Vec::with_capacity(n - n_test);
            let mut test = Vec::with_capacity(n_test);
            for (members, &take) in classes.iter().zip(&test_alloc) {
                let mut shuffled = members.clone();
                shuffled.shuffle(&mut rng);
                test.extend_from_slice(&shuffled[..take]);
                train.extend_from_slice(&shuffled[take..]);
            }
            train.sort_unstable();
            test.sort_unstable();
            splits.push(Split { train, test });
        }

        Ok(splits)
    }
}

/// Distribute `n_test` rows over classes proportionally to `counts`.
///
/// Floors the proportional share, then hands the remainder to the classes
/// with the largest fractional part (lower class first on ties). Every class
/// with at least two rows is guaranteed one test row and one training row
/// when the totals allow it.
pub fn allocate_test_rows(counts: &[usize], n_test: usize) -> Vec<usize> {
    let total: usize = counts.iter().sum();
    let exact: Vec<f64> = counts
        .iter()
        .map(|&c| n_test as f64 * c as f64 / total as f64)
        .collect();
    let mut alloc: Vec<usize> = exact.iter().map(|v| v.floor() as usize).collect();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let fa = exact[a] - alloc[a] as f64;
        let fb = exact[b] - alloc[b] as f64;
        fb.partial_cmp(&fa).unwrap_or(std::cmp::Ordering::Equal).then(a.cmp(&b))
    });
    let assigned: usize = alloc.iter().sum();
    for &class in order.iter().take(n_test.saturating_sub(assigned)) {
        alloc[class] += 1;
    }

    for class in 0..counts.len() {
        if alloc[class] == 0 && counts[class] >= 2 {
            // Borrow from the class with the most spare test rows.
            if let Some(donor) = (0..counts.len())
                .filter(|&d| alloc[d] > 1)
                .max_by_key(|&d| alloc[d])
            {
                alloc[donor] -= 1;
                alloc[class] = 1;
            }
        }
        if alloc[class] == counts[class] && counts[class] >= 2 {
            if let Some(receiver) = (0..counts.len())
                .filter(|&r| r != class && alloc[r] < counts[r].saturating_sub(1))
                .max_by_key(|&r| counts[r] - alloc[r])
            {
                alloc[class] -= 1;
                alloc[receiver] += 1;
            }
        }
    }

    alloc
}

/// Mean ROC-AUC of a model over repeated stratified splits.
#[derive(Debug)]
pub struct CrossValidator {
    splitter: StratifiedShuffleSplit,
    n_jobs: usize,
    pool: rayon::ThreadPool,
}

impl CrossValidator {
    /// Create a validator running at most `n_jobs` splits at once.
    ///
    /// `n_jobs == 0` uses every available core.
    pub fn new(splitter: StratifiedShuffleSplit, n_jobs: usize) -> Result<Self> {
        let n_jobs = if n_jobs == 0 { num_cpus::get() } else { n_jobs };
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_jobs)
            .build()
            .map_err(|e| GreedyLogitError::threading(format!("Failed to create thread pool: {}", e)))?;

        Ok(CrossValidator {
            splitter,
            n_jobs,
            pool,
        })
    }

    /// Validator with the default 15 splits, 10% test rows and 4 workers.
    pub fn with_seed(seed: u64) -> Result<Self> {
        Self::new(
            StratifiedShuffleSplit {
                seed,
                ..StratifiedShuffleSplit::default()
            },
            DEFAULT_N_JOBS,
        )
    }

    /// The splitter in use
    pub fn splitter(&self) -> &StratifiedShuffleSplit {
        &self.splitter
    }

    /// Worker count
    pub fn n_jobs(&self) -> usize {
        self.n_jobs
    }

    /// ROC-AUC of every split, in split order.
    pub fn split_scores<M: BinaryClassifier>(
        &self,
        x: &SparseBinaryMatrix,
        y: ArrayView1<'_, Label>,
        model: &PositiveClassProbability<M>,
    ) -> Result<Vec<f64>> {
        if x.nrows() != y.len() {
            return Err(GreedyLogitError::dimension_mismatch(
                format!("{} labels", x.nrows()),
                format!("{} labels", y.len()),
            ));
        }

        let splits = self.splitter.split(y)?;
        self.pool.install(|| {
            splits
                .par_iter()
                .map(|split| {
                    let x_train = x.select_rows(&split.train)?;
                    let y_train = y.select(Axis(0), &split.train);
                    let x_test = x.select_rows(&split.test)?;
                    let y_test = y.select(Axis(0), &split.test);

                    let mut fold_model = model.clone();
                    fold_model.fit(&x_train, y_train.view())?;
                    let proba = fold_model.predict_probability(&x_test)?;
                    roc_auc_score(y_test.view(), proba.view())
                })
                .collect()
        })
    }

    /// Arithmetic mean of [`CrossValidator::split_scores`].
    pub fn mean_auc<M: BinaryClassifier>(
        &self,
        x: &SparseBinaryMatrix,
        y: ArrayView1<'_, Label>,
        model: &PositiveClassProbability<M>,
    ) -> Result<f64> {
        let scores = self.split_scores(x, y, model)?;
        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }
}
