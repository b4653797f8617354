//! Binary classification metrics.

use crate::core::error::{GreedyLogitError, Result};
use crate::core::types::*;
use ndarray::ArrayView1;
use std::cmp::Ordering;

/// Area under the ROC curve.
///
/// Computed from the Mann-Whitney rank statistic with tied scores sharing
/// their average rank, which equals the trapezoidal ROC area. Fails when the
/// targets contain a single class, since the curve is undefined.
pub fn roc_auc_score(targets: ArrayView1<'_, Label>, scores: ArrayView1<'_, Score>) -> Result<f64> {
    if targets.len() != scores.len() {
        return Err(GreedyLogitError::dimension_mismatch(
            format!("{} scores", targets.len()),
            format!("{} scores", scores.len()),
        ));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(GreedyLogitError::numerical("ROC-AUC got non-finite scores"));
    }

    let n_pos = targets.iter().filter(|&&t| t == 1.0).count();
    let n_neg = targets.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(GreedyLogitError::numerical(
            "ROC-AUC is undefined when only one class is present",
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].partial_cmp(&scores[b]).unwrap_or(Ordering::Equal));

    let mut rank_sum_pos = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // Ranks are 1-based; the tie group start..end shares their mean.
        let avg_rank = (start + end + 1) as f64 / 2.0;
        let positives = order[start..end]
            .iter()
            .filter(|&&i| targets[i] == 1.0)
            .count();
        rank_sum_pos += avg_rank * positives as f64;
        start = end;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Ok((rank_sum_pos - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_auc_perfect() {
        let y = array![0.0, 0.0, 1.0, 1.0];
        let p = array![0.1, 0.2, 0.8, 0.9];
        assert_abs_diff_eq!(roc_auc_score(y.view(), p.view()).unwrap(), 1.0);
    }

    #[test]
    fn test_auc_worst() {
        let y = array![1.0, 1.0, 0.0, 0.0];
        let p = array![0.1, 0.2, 0.8, 0.9];
        assert_abs_diff_eq!(roc_auc_score(y.view(), p.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_auc_ties_count_half() {
        let y = array![0.0, 1.0];
        let p = array![0.5, 0.5];
        assert_abs_diff_eq!(roc_auc_score(y.view(), p.view()).unwrap(), 0.5);
    }

    #[test]
    fn test_auc_mixed() {
        // Pairs (pos, neg): (0.35 > 0.1), (0.35 < 0.4), (0.8 > 0.1), (0.8 > 0.4).
        let y = array![0.0, 0.0, 1.0, 1.0];
        let p = array![0.1, 0.4, 0.35, 0.8];
        assert_abs_diff_eq!(roc_auc_score(y.view(), p.view()).unwrap(), 0.75);
    }

    #[test]
    fn test_auc_single_class_is_error() {
        let y = array![1.0, 1.0];
        let p = array![0.2, 0.3];
        assert!(roc_auc_score(y.view(), p.view()).is_err());
    }

    #[test]
    fn test_auc_length_mismatch() {
        let y = array![1.0, 0.0];
        let p = array![0.2];
        assert!(roc_auc_score(y.view(), p.view()).is_err());
    }
}
