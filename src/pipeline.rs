//! End-to-end run: load, expand, select, tune, fit, predict, save.

use crate::config::PipelineConfig;
use crate::core::error::{GreedyLogitError, Result};
use crate::core::types::*;
use crate::dataset::interaction::{expand_interactions, expanded_names};
use crate::dataset::loader::CsvLoader;
use crate::dataset::onehot::OneHotEncoder;
use crate::dataset::sparse::SparseBinaryMatrix;
use crate::dataset::RawDataset;
use crate::hyperopt::HyperparameterSweeper;
use crate::io::submission::{append_score_line, write_submission};
use crate::model::{LogisticRegression, PositiveClassProbability};
use crate::selection::cv::{CrossValidator, StratifiedShuffleSplit};
use crate::selection::greedy::{BlockScorer, GreedyFeatureSelector};
use ndarray::{s, Array2, Axis};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Submission file written
    pub submission_path: PathBuf,
    /// Selected expanded-feature indices, ascending
    pub selected_features: Vec<FeatureIndex>,
    /// Column names of the selected features
    pub selected_names: Vec<String>,
    /// Chosen inverse regularization strength
    pub best_c: f64,
    /// Mean cross-validated AUC at `best_c`, on the `sweep_seed` splits
    pub best_auc: f64,
    /// Training rows
    pub num_train: usize,
    /// Test rows (and submission rows)
    pub num_test: usize,
}

/// Interaction features after expansion, with the train/test boundary.
struct ExpandedData {
    data: Array2<Category>,
    names: Vec<String>,
    num_train: usize,
}

/// One configured run of the whole procedure.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate `config` and create a pipeline
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Pipeline { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Execute the run.
    pub fn run(&self) -> Result<RunSummary> {
        let config = &self.config;

        log::info!("Reading dataset...");
        let raw = self.load()?;
        let labels = raw.labels();

        let expanded = self.expand(&raw)?;
        let num_train = expanded.num_train;
        let num_test = expanded.data.nrows() - num_train;
        log::info!(
            "{} training rows, {} test rows, {} candidate features",
            num_train,
            num_test,
            expanded.data.ncols()
        );

        // Blocks are fitted on training rows only and reused for every subset.
        let train_part = expanded.data.slice(s![..num_train, ..]);
        let blocks = OneHotEncoder::encode_columns(train_part)?;

        let model = PositiveClassProbability::new(self.model(config.initial_c)?);
        let validator = CrossValidator::new(
            StratifiedShuffleSplit::new(config.cv_splits, config.cv_test_size, config.seed)?,
            config.n_jobs,
        )?;

        log::info!("Performing greedy feature selection...");
        let scorer = BlockScorer::new(&blocks, labels, &model, &validator);
        let selection = GreedyFeatureSelector::new().select(blocks.len(), &scorer)?;
        let selected = selection.selected;
        let selected_names: Vec<String> =
            selected.iter().map(|&f| expanded.names[f].clone()).collect();
        log::info!("Selected feature names: {:?}", selected_names);

        log::info!("Performing hyperparameter selection...");
        let x_selected = scorer.design_matrix(&selected)?;
        let sweep_validator = CrossValidator::new(
            StratifiedShuffleSplit::new(config.cv_splits, config.cv_test_size, config.sweep_seed)?,
            config.n_jobs,
        )?;
        let sweep = HyperparameterSweeper::new().sweep(&config.c_grid.values(), |c| {
            let mut candidate = model.clone();
            candidate.set_regularization(c)?;
            sweep_validator.mean_auc(&x_selected, labels, &candidate)
        })?;

        let submission_name = config.submission_path.display().to_string();
        append_score_line(
            &config.scores_path,
            &submission_name,
            sweep.best_c,
            sweep.best_score,
            &selected,
        )?;

        log::info!("Performing One Hot Encoding on entire dataset...");
        let (x_train, x_test) = encode_selected(&expanded, &selected)?;

        log::info!("Training full model...");
        let mut final_model = PositiveClassProbability::new(self.model(sweep.best_c)?);
        final_model.fit(&x_train, labels)?;

        log::info!("Making prediction and saving results...");
        let predictions = final_model.predict_probability(&x_test)?;
        write_submission(&config.submission_path, predictions.view())?;

        Ok(RunSummary {
            submission_path: config.submission_path.clone(),
            selected_features: selected,
            selected_names,
            best_c: sweep.best_c,
            best_auc: sweep.best_score,
            num_train,
            num_test,
        })
    }

    fn load(&self) -> Result<RawDataset> {
        let config = &self.config;
        CsvLoader::new()
            .with_label_column(config.label_column.clone())
            .with_id_column(config.id_column.clone())
            .with_exclude_columns(config.exclude_columns.clone())
            .load(&config.train_path, &config.test_path)
    }

    fn expand(&self, raw: &RawDataset) -> Result<ExpandedData> {
        let num_features = raw.num_features();
        let degrees: Vec<usize> = self
            .config
            .interaction_degrees
            .iter()
            .copied()
            .filter(|&d| {
                let fits = d <= num_features;
                if !fits {
                    log::warn!(
                        "Skipping degree {} interactions: only {} raw columns",
                        d,
                        num_features
                    );
                }
                fits
            })
            .collect();

        let combined = raw.combined()?;
        Ok(ExpandedData {
            data: expand_interactions(combined.view(), &degrees)?,
            names: expanded_names(raw.feature_names(), &degrees),
            num_train: raw.num_train(),
        })
    }

    fn model(&self, c: f64) -> Result<LogisticRegression> {
        Ok(LogisticRegression::new()
            .with_c(c)?
            .with_max_iter(self.config.max_iter)
            .with_tol(self.config.tol))
    }
}

/// One-hot encode the selected columns over train and test together, then
/// split the rows back apart.
fn encode_selected(
    expanded: &ExpandedData,
    selected: &[FeatureIndex],
) -> Result<(SparseBinaryMatrix, SparseBinaryMatrix)> {
    if selected.is_empty() {
        return Err(GreedyLogitError::training("No features were selected"));
    }
    let columns = expanded.data.select(Axis(1), selected);
    let (x_all, keymaps) = OneHotEncoder::encode(columns.view(), None)?;
    log::debug!(
        "Final design matrix: {} columns from {} keymaps",
        x_all.ncols(),
        keymaps.len()
    );

    let n = x_all.nrows();
    Ok((
        x_all.slice_rows(0..expanded.num_train)?,
        x_all.slice_rows(expanded.num_train..n)?,
    ))
}

/// Run the pipeline once per seed in `config.seeds`, writing one
/// `<prefix>_pred_<seed>.csv` per seed. Stops at the first failure.
pub fn run_seed_sweep(config: &PipelineConfig) -> Result<Vec<RunSummary>> {
    if config.seeds.is_empty() {
        return Err(GreedyLogitError::config("Seed sweep has no seeds"));
    }

    let mut summaries = Vec::with_capacity(config.seeds.len());
    for &seed in &config.seeds {
        log::info!("Seed {}", seed);
        let summary = Pipeline::new(config.for_seed(seed))?.run()?;
        log::info!(
            "{}: C={:.6} AUC={:.6} {:?}",
            summary.submission_path.display(),
            summary.best_c,
            summary.best_auc,
            summary.selected_features
        );
        summaries.push(summary);
    }
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use std::fs;
    use tempfile::tempdir;

    fn write(path: &std::path::Path, content: &str) {
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_pipeline_rejects_invalid_config() {
        let config = ConfigBuilder::new().build().unwrap();
        let mut bad = config.clone();
        bad.cv_splits = 0;
        assert!(Pipeline::new(bad).is_err());
        assert!(Pipeline::new(config).is_ok());
    }

    #[test]
    fn test_missing_train_file_is_error() {
        let dir = tempdir().unwrap();
        let config = ConfigBuilder::new()
            .train_path(dir.path().join("nope.csv"))
            .test_path(dir.path().join("nope_test.csv"))
            .build()
            .unwrap();
        assert!(Pipeline::new(config).unwrap().run().is_err());
    }

    #[test]
    fn test_pipeline_picks_informative_column() {
        let dir = tempdir().unwrap();
        let train = dir.path().join("train.csv");
        let test = dir.path().join("test.csv");

        // Column A decides the label, column B is noise.
        let mut train_csv = String::from("ACTION,A,B\n");
        for i in 0..40 {
            let label = i % 2;
            train_csv.push_str(&format!("{},{},{}\n", label, 10 + label, i % 3));
        }
        write(&train, &train_csv);
        write(&test, "id,A,B\n1,10,0\n2,11,1\n3,12,2\n");

        let config = ConfigBuilder::new()
            .train_path(&train)
            .test_path(&test)
            .submission_path(dir.path().join("sub.csv"))
            .scores_path(dir.path().join("scores.txt"))
            .interaction_degrees(vec![2])
            .cross_validation(5, 0.25)
            .n_jobs(2)
            .build()
            .unwrap();

        let summary = Pipeline::new(config).unwrap().run().unwrap();
        assert_eq!(summary.selected_features, vec![0]);
        assert_eq!(summary.selected_names, vec!["A".to_string()]);
        assert_eq!(summary.num_train, 40);
        assert_eq!(summary.num_test, 3);
        assert!(summary.best_auc > 0.99);

        let submission = fs::read_to_string(dir.path().join("sub.csv")).unwrap();
        let rows: Vec<&str> = submission.lines().collect();
        assert_eq!(rows.len(), 4);
        let p1: f64 = rows[1].split(',').nth(1).unwrap().parse().unwrap();
        let p2: f64 = rows[2].split(',').nth(1).unwrap().parse().unwrap();
        assert!(p1 < 0.5 && p2 > 0.5);
    }

    #[test]
    fn test_sweep_scores_on_sweep_seed_splits() {
        let dir = tempdir().unwrap();
        let train = dir.path().join("train.csv");
        let test = dir.path().join("test.csv");

        // A mostly decides the label, B is noise.
        let mut train_csv = String::from("ACTION,A,B\n");
        for i in 0..60 {
            let a = i % 4;
            let label = if (a < 2) != (i % 7 == 0) { 1 } else { 0 };
            train_csv.push_str(&format!("{},{},{}\n", label, a, (i * 5) % 3));
        }
        write(&train, &train_csv);
        write(&test, "id,A,B\n1,0,0\n2,3,1\n");

        let config = ConfigBuilder::new()
            .train_path(&train)
            .test_path(&test)
            .submission_path(dir.path().join("sub.csv"))
            .scores_path(dir.path().join("scores.txt"))
            .interaction_degrees(vec![])
            .cross_validation(6, 0.25)
            .n_jobs(2)
            .seed(1)
            .build()
            .unwrap();
        assert_eq!(config.sweep_seed, 25);

        let pipeline = Pipeline::new(config.clone()).unwrap();
        let summary = pipeline.run().unwrap();

        let raw = pipeline.load().unwrap();
        let blocks = OneHotEncoder::encode_columns(raw.train()).unwrap();
        let model = PositiveClassProbability::new(pipeline.model(summary.best_c).unwrap());
        let mean_auc = |seed: u64| {
            let validator =
                CrossValidator::new(StratifiedShuffleSplit::new(6, 0.25, seed).unwrap(), 2).unwrap();
            let scorer = BlockScorer::new(&blocks, raw.labels(), &model, &validator);
            let x = scorer.design_matrix(&summary.selected_features).unwrap();
            validator.mean_auc(&x, raw.labels(), &model).unwrap()
        };

        assert_eq!(summary.best_auc, mean_auc(25));
    }
}
