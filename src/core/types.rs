//! Core data types for greedy-logit.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical cell value. Raw integer codes are kept as-is; text cells and
/// interaction tuples are folded into this type with [`hash_tuple`] /
/// [`hash_text`].
pub type Category = i64;

/// Index of a column in the expanded (raw + interaction) column space.
pub type FeatureIndex = usize;

/// Probability or decision value type.
pub type Score = f64;

/// Binary target value type (0.0 or 1.0).
pub type Label = f64;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(state: u64, bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(state, |hash, &byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME))
}

/// Hash a tuple of categories into a single category.
///
/// FNV-1a over the little-endian bytes of each value, prefixed by the tuple
/// length, so the result is stable across runs, platforms and toolchains.
pub fn hash_tuple(values: &[Category]) -> Category {
    let mut hash = fnv1a(FNV_OFFSET_BASIS, &(values.len() as u64).to_le_bytes());
    for value in values {
        hash = fnv1a(hash, &value.to_le_bytes());
    }
    hash as Category
}

/// Hash a text cell into a category.
pub fn hash_text(text: &str) -> Category {
    fnv1a(FNV_OFFSET_BASIS, text.as_bytes()) as Category
}

/// One entry of a score history: a mean AUC and the candidate that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry<T> {
    /// Mean cross-validated ROC-AUC
    pub score: Score,
    /// Feature index or hyperparameter value
    pub candidate: T,
}

impl<T> ScoreEntry<T> {
    /// Create a new history entry
    pub fn new(score: Score, candidate: T) -> Self {
        ScoreEntry { score, candidate }
    }
}

impl<T: fmt::Display> fmt::Display for ScoreEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {})", self.score, self.candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_tuple_is_deterministic() {
        assert_eq!(hash_tuple(&[1, 2, 3]), hash_tuple(&[1, 2, 3]));
        assert_ne!(hash_tuple(&[1, 2]), hash_tuple(&[2, 1]));
        assert_ne!(hash_tuple(&[1, 2]), hash_tuple(&[1, 2, 0]));
    }

    #[test]
    fn test_hash_text() {
        assert_eq!(hash_text("MANAGER"), hash_text("MANAGER"));
        assert_ne!(hash_text("MANAGER"), hash_text("manager"));
    }

    #[test]
    fn test_score_entry_display() {
        let entry = ScoreEntry::new(0.8, 2usize);
        assert_eq!(entry.to_string(), "(0.800000, 2)");
    }
}
