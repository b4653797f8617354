//! Evaluation metrics used to score candidate feature sets.

pub mod classification;

pub use classification::roc_auc_score;
