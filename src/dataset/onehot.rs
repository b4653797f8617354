//! One-hot encoding of categorical columns into sparse binary blocks.
//!
//! Each column gets a [`KeyMap`] assigning its observed categories to dense
//! indices in ascending category order. A keymap can be reused to encode new
//! data consistently; categories it does not know produce no set bit.

use crate::core::error::{GreedyLogitError, Result};
use crate::core::types::Category;
use crate::dataset::sparse::SparseBinaryMatrix;
use ndarray::{ArrayView1, ArrayView2};
use std::collections::{BTreeSet, HashMap};

/// Category -> column index mapping for a single categorical column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyMap {
    index: HashMap<Category, usize>,
    categories: Vec<Category>,
}

impl KeyMap {
    /// Build from the distinct values of a column, sorted ascending.
    pub fn fit(column: ArrayView1<'_, Category>) -> Self {
        let distinct: BTreeSet<Category> = column.iter().copied().collect();
        Self::from_categories(distinct.into_iter().collect())
    }

    /// Build from an explicit category order; duplicates keep their first slot.
    pub fn from_categories(categories: Vec<Category>) -> Self {
        let mut index = HashMap::with_capacity(categories.len());
        let mut ordered = Vec::with_capacity(categories.len());
        for category in categories {
            if !index.contains_key(&category) {
                index.insert(category, ordered.len());
                ordered.push(category);
            }
        }
        KeyMap {
            index,
            categories: ordered,
        }
    }

    /// Column index of `category`, if mapped.
    pub fn index_of(&self, category: Category) -> Option<usize> {
        self.index.get(&category).copied()
    }

    /// Category stored at column `index`.
    pub fn category_at(&self, index: usize) -> Option<Category> {
        self.categories.get(index).copied()
    }

    /// Number of mapped categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether no category is mapped.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Encode one column into a `rows x len()` block.
    pub fn encode_column(&self, column: ArrayView1<'_, Category>) -> Result<SparseBinaryMatrix> {
        let hits: Vec<Option<usize>> = column.iter().map(|&v| self.index_of(v)).collect();
        SparseBinaryMatrix::from_optional_columns(self.len(), &hits)
    }
}

/// Stateless one-hot encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneHotEncoder;

impl OneHotEncoder {
    /// Encode every column of `data` and concatenate the blocks.
    ///
    /// When `keymaps` is `None` one keymap per column is built from `data`
    /// itself. The keymaps actually used are returned alongside the matrix.
    pub fn encode(
        data: ArrayView2<'_, Category>,
        keymaps: Option<&[KeyMap]>,
    ) -> Result<(SparseBinaryMatrix, Vec<KeyMap>)> {
        let keymaps: Vec<KeyMap> = match keymaps {
            Some(maps) => {
                if maps.len() != data.ncols() {
                    return Err(GreedyLogitError::dimension_mismatch(
                        format!("{} keymaps", data.ncols()),
                        format!("{} keymaps", maps.len()),
                    ));
                }
                maps.to_vec()
            }
            None => data.columns().into_iter().map(KeyMap::fit).collect(),
        };

        if data.ncols() == 0 {
            return Ok((SparseBinaryMatrix::zeros(data.nrows(), 0), keymaps));
        }

        let blocks = data
            .columns()
            .into_iter()
            .zip(&keymaps)
            .map(|(column, keymap)| keymap.encode_column(column))
            .collect::<Result<Vec<_>>>()?;
        let refs: Vec<&SparseBinaryMatrix> = blocks.iter().collect();
        let matrix = SparseBinaryMatrix::hstack(&refs)?;

        Ok((matrix, keymaps))
    }

    /// One block per column, each with its own freshly built keymap.
    pub fn encode_columns(data: ArrayView2<'_, Category>) -> Result<Vec<SparseBinaryMatrix>> {
        data.columns()
            .into_iter()
            .map(|column| KeyMap::fit(column).encode_column(column))
            .collect()
    }

    /// Recover the category of every cell from a matrix produced by
    /// [`OneHotEncoder::encode`]. Cells with no set bit decode to `None`.
    pub fn decode(
        matrix: &SparseBinaryMatrix,
        keymaps: &[KeyMap],
    ) -> Result<Vec<Vec<Option<Category>>>> {
        let expected: usize = keymaps.iter().map(KeyMap::len).sum();
        if expected != matrix.ncols() {
            return Err(GreedyLogitError::dimension_mismatch(
                format!("{} columns", expected),
                format!("{} columns", matrix.ncols()),
            ));
        }

        // Starting column of each block.
        let offsets: Vec<usize> = keymaps
            .iter()
            .scan(0, |acc, km| {
                let start = *acc;
                *acc += km.len();
                Some(start)
            })
            .collect();

        let mut decoded = Vec::with_capacity(matrix.nrows());
        for row in matrix.rows() {
            let mut cells = vec![None; keymaps.len()];
            for &col in row {
                // Last block whose start is <= col.
                let block = offsets.partition_point(|&start| start <= col) - 1;
                if cells[block].is_some() {
                    return Err(GreedyLogitError::dataset(format!(
                        "block {} has more than one set bit in a row",
                        block
                    )));
                }
                cells[block] = keymaps[block].category_at(col - offsets[block]);
            }
            decoded.push(cells);
        }

        Ok(decoded)
    }
}
