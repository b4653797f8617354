//! Interaction column expansion.
//!
//! For a degree `d`, every strictly increasing combination of `d` column
//! positions yields one derived categorical column whose value is the hash
//! of the tuple of values at those positions.

use crate::core::error::{GreedyLogitError, Result};
use crate::core::types::{hash_tuple, Category};
use ndarray::{concatenate, Array2, ArrayView2, Axis};

/// Lexicographic iterator over the `k`-combinations of `0..n`.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    current: Option<Vec<usize>>,
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        let current = self.current.take()?;
        let k = current.len();

        let mut next = current.clone();
        // Rightmost position that can still move up.
        let pivot = (0..k).rev().find(|&i| next[i] < self.n - k + i);
        if let Some(i) = pivot {
            next[i] += 1;
            for j in i + 1..k {
                next[j] = next[j - 1] + 1;
            }
            self.current = Some(next);
        }

        Some(current)
    }
}

/// All `k`-combinations of `0..n` in lexicographic order.
///
/// Yields nothing when `k == 0` or `k > n`.
pub fn combinations(n: usize, k: usize) -> Combinations {
    let current = if k == 0 || k > n {
        None
    } else {
        Some((0..k).collect())
    };
    Combinations { n, current }
}

/// Binomial coefficient `C(n, k)`.
pub fn n_choose_k(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    (0..k).fold(1usize, |acc, i| acc * (n - i) / (i + 1))
}

/// Group the columns of `data` into all combinations of `degree` columns.
///
/// Returns a `rows x C(n, degree)` matrix, columns in lexicographic
/// combination order.
pub fn group_data(data: ArrayView2<'_, Category>, degree: usize) -> Result<Array2<Category>> {
    let (rows, n) = data.dim();
    if degree < 2 || degree > n {
        return Err(GreedyLogitError::invalid_parameter(
            "degree",
            degree.to_string(),
            format!("must be in [2, {}] for {} columns", n, n),
        ));
    }

    let combos: Vec<Vec<usize>> = combinations(n, degree).collect();
    let mut out = Array2::zeros((rows, combos.len()));
    let mut tuple = vec![0; degree];

    for (i, row) in data.outer_iter().enumerate() {
        for (c, combo) in combos.iter().enumerate() {
            for (slot, &col) in tuple.iter_mut().zip(combo) {
                *slot = row[col];
            }
            out[[i, c]] = hash_tuple(&tuple);
        }
    }

    Ok(out)
}

/// Names of the derived columns, e.g. `RESOURCE+MGR_ID`.
pub fn interaction_names(names: &[String], degree: usize) -> Vec<String> {
    combinations(names.len(), degree)
        .map(|combo| {
            combo
                .iter()
                .map(|&i| names[i].as_str())
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect()
}

/// Raw columns followed by the interaction columns of each degree.
pub fn expand_interactions(
    data: ArrayView2<'_, Category>,
    degrees: &[usize],
) -> Result<Array2<Category>> {
    let mut blocks = vec![data.to_owned()];
    for &degree in degrees {
        let grouped = group_data(data, degree)?;
        log::debug!(
            "Degree {} interactions: {} columns",
            degree,
            grouped.ncols()
        );
        blocks.push(grouped);
    }

    let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
    concatenate(Axis(1), &views)
        .map_err(|e| GreedyLogitError::dataset(format!("Failed to stack interactions: {}", e)))
}

/// Column names matching [`expand_interactions`].
pub fn expanded_names(names: &[String], degrees: &[usize]) -> Vec<String> {
    let mut out = names.to_vec();
    for &degree in degrees {
        out.extend(interaction_names(names, degree));
    }
    out
}
