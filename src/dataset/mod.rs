//! Dataset management module for greedy-logit.
//!
//! Holds the raw categorical train/test tables, the interaction expander,
//! the one-hot encoder and the sparse binary matrix they produce.

pub mod interaction;
pub mod loader;
pub mod onehot;
pub mod sparse;

pub use interaction::{
    combinations, expand_interactions, expanded_names, group_data, interaction_names, n_choose_k,
};
pub use loader::{CsvConfig, CsvLoader};
pub use onehot::{KeyMap, OneHotEncoder};
pub use sparse::SparseBinaryMatrix;

use crate::core::error::{GreedyLogitError, Result};
use crate::core::types::*;
use ndarray::{concatenate, Array1, Array2, ArrayView1, ArrayView2, Axis};

/// Raw categorical train/test tables sharing one set of feature columns.
#[derive(Debug, Clone)]
pub struct RawDataset {
    train: Array2<Category>,
    test: Array2<Category>,
    labels: Array1<Label>,
    feature_names: Vec<String>,
}

impl RawDataset {
    /// Create a dataset, checking that shapes agree and labels are binary.
    pub fn new(
        train: Array2<Category>,
        test: Array2<Category>,
        labels: Array1<Label>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if train.ncols() != test.ncols() {
            return Err(GreedyLogitError::dimension_mismatch(
                format!("{} test columns", train.ncols()),
                format!("{} test columns", test.ncols()),
            ));
        }
        if train.ncols() != feature_names.len() {
            return Err(GreedyLogitError::dimension_mismatch(
                format!("{} feature names", train.ncols()),
                format!("{} feature names", feature_names.len()),
            ));
        }
        if train.nrows() != labels.len() {
            return Err(GreedyLogitError::dimension_mismatch(
                format!("{} labels", train.nrows()),
                format!("{} labels", labels.len()),
            ));
        }
        if train.nrows() == 0 {
            return Err(GreedyLogitError::dataset("Training set is empty"));
        }
        if train.ncols() == 0 {
            return Err(GreedyLogitError::dataset("No feature columns"));
        }
        if labels.iter().any(|&y| y != 0.0 && y != 1.0) {
            return Err(GreedyLogitError::dataset("Labels must be 0 or 1"));
        }

        Ok(RawDataset {
            train,
            test,
            labels,
            feature_names,
        })
    }

    /// Training rows
    pub fn train(&self) -> ArrayView2<'_, Category> {
        self.train.view()
    }

    /// Test rows
    pub fn test(&self) -> ArrayView2<'_, Category> {
        self.test.view()
    }

    /// Training labels
    pub fn labels(&self) -> ArrayView1<'_, Label> {
        self.labels.view()
    }

    /// Feature column names
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of training rows
    pub fn num_train(&self) -> usize {
        self.train.nrows()
    }

    /// Number of test rows
    pub fn num_test(&self) -> usize {
        self.test.nrows()
    }

    /// Number of raw feature columns
    pub fn num_features(&self) -> usize {
        self.train.ncols()
    }

    /// Train rows followed by test rows.
    pub fn combined(&self) -> Result<Array2<Category>> {
        concatenate(Axis(0), &[self.train.view(), self.test.view()])
            .map_err(|e| GreedyLogitError::dataset(format!("Failed to stack train/test: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn test_raw_dataset_combined_keeps_order() {
        let data = RawDataset::new(
            array![[1, 2], [3, 4]],
            array![[5, 6]],
            array![0.0, 1.0],
            names(2),
        )
        .unwrap();

        assert_eq!(data.num_train(), 2);
        assert_eq!(data.num_test(), 1);
        assert_eq!(data.combined().unwrap(), array![[1, 2], [3, 4], [5, 6]]);
    }

    #[test]
    fn test_raw_dataset_validation() {
        assert!(RawDataset::new(array![[1, 2]], array![[1]], array![0.0], names(2)).is_err());
        assert!(RawDataset::new(array![[1, 2]], array![[1, 2]], array![0.0, 1.0], names(2)).is_err());
        assert!(RawDataset::new(array![[1, 2]], array![[1, 2]], array![0.5], names(2)).is_err());
        assert!(RawDataset::new(array![[1, 2]], array![[1, 2]], array![1.0], names(1)).is_err());
    }
}
