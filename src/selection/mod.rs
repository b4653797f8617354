//! Feature subset search: cross-validated scoring and greedy forward selection.

pub mod cv;
pub mod greedy;

pub use cv::{CrossValidator, Split, StratifiedShuffleSplit};
pub use greedy::{BlockScorer, GreedyFeatureSelector, SelectionResult, SubsetScorer};
