//! Compressed sparse row storage for binary (0/1) matrices.
//!
//! One-hot blocks never store explicit values: a set bit is the presence of
//! its column index in the row's index list. Column indices within a row are
//! kept sorted and unique.

use crate::core::error::{GreedyLogitError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use std::ops::Range;

/// Sparse binary matrix in CSR layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SparseBinaryMatrix {
    nrows: usize,
    ncols: usize,
    /// Row `i` occupies `indices[indptr[i]..indptr[i + 1]]`
    indptr: Vec<usize>,
    indices: Vec<usize>,
}

impl SparseBinaryMatrix {
    /// All-zero matrix.
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        SparseBinaryMatrix {
            nrows,
            ncols,
            indptr: vec![0; nrows + 1],
            indices: Vec::new(),
        }
    }

    /// Build from per-row lists of set column indices.
    pub fn from_rows(ncols: usize, rows: Vec<Vec<usize>>) -> Result<Self> {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        indptr.push(0);

        for (row_idx, mut row) in rows.into_iter().enumerate() {
            row.sort_unstable();
            row.dedup();
            if let Some(&last) = row.last() {
                if last >= ncols {
                    return Err(GreedyLogitError::dataset(format!(
                        "row {} sets column {} but the matrix has {} columns",
                        row_idx, last, ncols
                    )));
                }
            }
            indices.extend(row);
            indptr.push(indices.len());
        }

        Ok(SparseBinaryMatrix {
            nrows: indptr.len() - 1,
            ncols,
            indptr,
            indices,
        })
    }

    /// Build a one-hot block where each row has at most one set column.
    pub fn from_optional_columns(ncols: usize, columns: &[Option<usize>]) -> Result<Self> {
        let mut indptr = Vec::with_capacity(columns.len() + 1);
        let mut indices = Vec::with_capacity(columns.len());
        indptr.push(0);

        for (row_idx, column) in columns.iter().enumerate() {
            if let Some(col) = *column {
                if col >= ncols {
                    return Err(GreedyLogitError::dataset(format!(
                        "row {} sets column {} but the block has {} columns",
                        row_idx, col, ncols
                    )));
                }
                indices.push(col);
            }
            indptr.push(indices.len());
        }

        Ok(SparseBinaryMatrix {
            nrows: columns.len(),
            ncols,
            indptr,
            indices,
        })
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of set bits.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Sorted column indices set in row `i`.
    pub fn row(&self, i: usize) -> &[usize] {
        &self.indices[self.indptr[i]..self.indptr[i + 1]]
    }

    /// Iterate over rows as index slices.
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> + '_ {
        (0..self.nrows).map(move |i| self.row(i))
    }

    /// Whether bit `(i, j)` is set.
    pub fn get(&self, i: usize, j: usize) -> bool {
        i < self.nrows && self.row(i).binary_search(&j).is_ok()
    }

    /// Concatenate matrices with the same row count side by side.
    pub fn hstack(blocks: &[&SparseBinaryMatrix]) -> Result<Self> {
        let first = blocks
            .first()
            .ok_or_else(|| GreedyLogitError::dataset("cannot hstack an empty list of blocks"))?;
        let nrows = first.nrows;

        for block in blocks {
            if block.nrows != nrows {
                return Err(GreedyLogitError::dimension_mismatch(
                    format!("{} rows", nrows),
                    format!("{} rows", block.nrows),
                ));
            }
        }

        let ncols = blocks.iter().map(|b| b.ncols).sum();
        let nnz = blocks.iter().map(|b| b.nnz()).sum();
        let mut indptr = Vec::with_capacity(nrows + 1);
        let mut indices = Vec::with_capacity(nnz);
        indptr.push(0);

        for i in 0..nrows {
            let mut offset = 0;
            for block in blocks {
                indices.extend(block.row(i).iter().map(|&j| j + offset));
                offset += block.ncols;
            }
            indptr.push(indices.len());
        }

        Ok(SparseBinaryMatrix {
            nrows,
            ncols,
            indptr,
            indices,
        })
    }

    /// Gather the given rows, in the given order.
    pub fn select_rows(&self, rows: &[usize]) -> Result<Self> {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        indptr.push(0);

        for &i in rows {
            if i >= self.nrows {
                return Err(GreedyLogitError::invalid_parameter(
                    "row",
                    i.to_string(),
                    format!("matrix has {} rows", self.nrows),
                ));
            }
            indices.extend_from_slice(self.row(i));
            indptr.push(indices.len());
        }

        Ok(SparseBinaryMatrix {
            nrows: rows.len(),
            ncols: self.ncols,
            indptr,
            indices,
        })
    }

    /// Contiguous block of rows.
    pub fn slice_rows(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end || range.end > self.nrows {
            return Err(GreedyLogitError::invalid_parameter(
                "rows",
                format!("{}..{}", range.start, range.end),
                format!("matrix has {} rows", self.nrows),
            ));
        }
        let start = self.indptr[range.start];
        let end = self.indptr[range.end];

        Ok(SparseBinaryMatrix {
            nrows: range.len(),
            ncols: self.ncols,
            indptr: self.indptr[range.start..=range.end]
                .iter()
                .map(|&p| p - start)
                .collect(),
            indices: self.indices[start..end].to_vec(),
        })
    }

    /// `X w`: for each row, the sum of the weights of its set columns.
    pub fn dot(&self, weights: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        if weights.len() != self.ncols {
            return Err(GreedyLogitError::dimension_mismatch(
                format!("{} weights", self.ncols),
                format!("{} weights", weights.len()),
            ));
        }
        Ok(self
            .rows()
            .map(|row| row.iter().map(|&j| weights[j]).sum())
            .collect())
    }

    /// `X^T v`: for each column, the sum of `v` over rows where it is set.
    pub fn transpose_dot(&self, v: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        if v.len() != self.nrows {
            return Err(GreedyLogitError::dimension_mismatch(
                format!("{} values", self.nrows),
                format!("{} values", v.len()),
            ));
        }
        let mut out = Array1::zeros(self.ncols);
        for (row, &value) in self.rows().zip(v.iter()) {
            for &j in row {
                out[j] += value;
            }
        }
        Ok(out)
    }

    /// Dense 0/1 copy, mostly useful for inspection in tests.
    pub fn to_dense(&self) -> Array2<u8> {
        let mut dense = Array2::zeros((self.nrows, self.ncols));
        for (i, row) in self.rows().enumerate() {
            for &j in row {
                dense[[i, j]] = 1;
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> SparseBinaryMatrix {
        SparseBinaryMatrix::from_rows(3, vec![vec![0, 2], vec![], vec![1], vec![2, 0, 2]]).unwrap()
    }

    #[test]
    fn test_from_rows_sorts_and_dedups() {
        let m = sample();
        assert_eq!(m.nrows(), 4);
        assert_eq!(m.ncols(), 3);
        assert_eq!(m.row(3), &[0, 2]);
        assert_eq!(m.nnz(), 5);
        assert!(m.get(0, 2));
        assert!(!m.get(1, 0));
    }

    #[test]
    fn test_from_rows_rejects_out_of_range() {
        assert!(SparseBinaryMatrix::from_rows(2, vec![vec![2]]).is_err());
        assert!(SparseBinaryMatrix::from_optional_columns(2, &[Some(0), Some(5)]).is_err());
    }

    #[test]
    fn test_hstack_offsets_columns() {
        let a = SparseBinaryMatrix::from_optional_columns(2, &[Some(0), Some(1), None]).unwrap();
        let b = SparseBinaryMatrix::from_optional_columns(3, &[Some(2), None, Some(0)]).unwrap();
        let m = SparseBinaryMatrix::hstack(&[&a, &b]).unwrap();

        assert_eq!(m.ncols(), 5);
        assert_eq!(
            m.to_dense(),
            array![[1, 0, 0, 0, 1], [0, 1, 0, 0, 0], [0, 0, 1, 0, 0]]
        );
    }

    #[test]
    fn test_hstack_row_mismatch() {
        let a = SparseBinaryMatrix::zeros(2, 1);
        let b = SparseBinaryMatrix::zeros(3, 1);
        assert!(SparseBinaryMatrix::hstack(&[&a, &b]).is_err());
        assert!(SparseBinaryMatrix::hstack(&[]).is_err());
    }

    #[test]
    fn test_select_and_slice_rows() {
        let m = sample();
        let picked = m.select_rows(&[2, 0]).unwrap();
        assert_eq!(picked.row(0), &[1]);
        assert_eq!(picked.row(1), &[0, 2]);

        let tail = m.slice_rows(2..4).unwrap();
        assert_eq!(tail.nrows(), 2);
        assert_eq!(tail.row(0), &[1]);
        assert_eq!(tail.row(1), &[0, 2]);

        assert!(m.select_rows(&[4]).is_err());
        assert!(m.slice_rows(3..5).is_err());
    }

    #[test]
    fn test_dot_products() {
        let m = sample();
        let w = array![1.0, 10.0, 100.0];
        assert_eq!(m.dot(w.view()).unwrap(), array![101.0, 0.0, 10.0, 101.0]);

        let v = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(m.transpose_dot(v.view()).unwrap(), array![5.0, 3.0, 5.0]);

        assert!(m.dot(array![1.0].view()).is_err());
        assert!(m.transpose_dot(array![1.0].view()).is_err());
    }
}
