//! Forward greedy feature selection.
//!
//! Starting from the empty set, each round adds the single feature whose
//! addition gives the best cross-validated score. Selection stops at the
//! first round that fails to improve on the previous one, and that round's
//! addition is dropped again.

use crate::core::error::{GreedyLogitError, Result};
use crate::core::traits::BinaryClassifier;
use crate::core::types::*;
use crate::dataset::sparse::SparseBinaryMatrix;
use crate::model::PositiveClassProbability;
use crate::selection::cv::CrossValidator;
use ndarray::ArrayView1;

/// Scores a candidate feature subset, higher is better.
///
/// The subset is given in insertion order: previously selected features
/// followed by the candidate.
pub trait SubsetScorer {
    /// Score the subset
    fn score(&self, features: &[FeatureIndex]) -> Result<Score>;
}

impl<F> SubsetScorer for F
where
    F: Fn(&[FeatureIndex]) -> Result<Score>,
{
    fn score(&self, features: &[FeatureIndex]) -> Result<Score> {
        self(features)
    }
}

/// Outcome of a greedy run.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionResult {
    /// Retained features, ascending
    pub selected: Vec<FeatureIndex>,
    /// Best `(score, feature)` of every round, including the rejected last one
    pub history: Vec<ScoreEntry<FeatureIndex>>,
    /// Score of the round that produced `selected`
    pub best_score: Score,
}

/// Forward greedy selector.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyFeatureSelector;

impl GreedyFeatureSelector {
    /// Create a selector
    pub fn new() -> Self {
        GreedyFeatureSelector
    }

    /// Run selection over features `0..num_features`.
    pub fn select<S: SubsetScorer + ?Sized>(
        &self,
        num_features: usize,
        scorer: &S,
    ) -> Result<SelectionResult> {
        if num_features == 0 {
            return Err(GreedyLogitError::invalid_parameter(
                "num_features",
                "0",
                "greedy selection needs at least one candidate feature",
            ));
        }

        let mut good_features: Vec<FeatureIndex> = Vec::new();
        let mut history: Vec<ScoreEntry<FeatureIndex>> = Vec::new();

        while history.len() < 2 || improved(&history) {
            let mut best: Option<ScoreEntry<FeatureIndex>> = None;
            let mut subset = Vec::with_capacity(good_features.len() + 1);

            for f in (0..num_features).filter(|f| !good_features.contains(f)) {
                subset.clear();
                subset.extend_from_slice(&good_features);
                subset.push(f);

                let score = scorer.score(&subset)?;
                log::debug!("Feature: {} Mean AUC: {:.6}", f, score);

                // Strict comparison keeps the lower index on ties.
                if best.as_ref().map_or(true, |b| score > b.score) {
                    best = Some(ScoreEntry::new(score, f));
                }
            }

            let Some(round_best) = best else {
                break;
            };
            good_features.push(round_best.candidate);
            history.push(round_best);
            log::info!("Current features: {:?}", sorted(&good_features));
        }

        let mut best_score = history.last().map(|e| e.score).unwrap_or(f64::NEG_INFINITY);
        if history.len() >= 2 && !improved(&history) {
            good_features.pop();
            best_score = history[history.len() - 2].score;
        }

        let selected = sorted(&good_features);
        log::info!("Selected features {:?}", selected);

        Ok(SelectionResult {
            selected,
            history,
            best_score,
        })
    }
}

fn improved(history: &[ScoreEntry<FeatureIndex>]) -> bool {
    match history {
        [.., prev, last] => last.score > prev.score,
        _ => false,
    }
}

fn sorted(features: &[FeatureIndex]) -> Vec<FeatureIndex> {
    let mut out = features.to_vec();
    out.sort_unstable();
    out
}

/// Scores subsets by the mean cross-validated AUC of a model trained on the
/// horizontally stacked one-hot blocks of the subset.
#[derive(Debug)]
pub struct BlockScorer<'a, M> {
    blocks: &'a [SparseBinaryMatrix],
    labels: ArrayView1<'a, Label>,
    model: &'a PositiveClassProbability<M>,
    validator: &'a CrossValidator,
}

impl<'a, M: BinaryClassifier> BlockScorer<'a, M> {
    /// Create a scorer over cached per-feature blocks
    pub fn new(
        blocks: &'a [SparseBinaryMatrix],
        labels: ArrayView1<'a, Label>,
        model: &'a PositiveClassProbability<M>,
        validator: &'a CrossValidator,
    ) -> Self {
        BlockScorer {
            blocks,
            labels,
            model,
            validator,
        }
    }

    /// Stack the blocks of `features` in the given order.
    pub fn design_matrix(&self, features: &[FeatureIndex]) -> Result<SparseBinaryMatrix> {
        let parts = features
            .iter()
            .map(|&f| {
                self.blocks.get(f).ok_or_else(|| {
                    GreedyLogitError::invalid_parameter(
                        "feature",
                        f.to_string(),
                        format!("only {} feature blocks are cached", self.blocks.len()),
                    )
                })
            })
            .collect::<Result<Vec<&SparseBinaryMatrix>>>()?;
        SparseBinaryMatrix::hstack(&parts)
    }
}

impl<M: BinaryClassifier> SubsetScorer for BlockScorer<'_, M> {
    fn score(&self, features: &[FeatureIndex]) -> Result<Score> {
        let x = self.design_matrix(features)?;
        self.validator.mean_auc(&x, self.labels, self.model)
    }
}
