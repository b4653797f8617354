//! Pipeline configuration: defaults, validation, file loading and
//! environment overrides.

use crate::core::constants::*;
use crate::core::error::{GreedyLogitError, Result};
use crate::hyperopt::GridSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the training CSV path.
pub const ENV_TRAIN: &str = "GREEDY_LOGIT_TRAIN";
/// Environment variable overriding the test CSV path.
pub const ENV_TEST: &str = "GREEDY_LOGIT_TEST";
/// Environment variable overriding the submission path.
pub const ENV_SUBMIT: &str = "GREEDY_LOGIT_SUBMIT";
/// Environment variable overriding the score log path.
pub const ENV_SCORES: &str = "GREEDY_LOGIT_SCORES";
/// Environment variable overriding the split seed.
pub const ENV_SEED: &str = "GREEDY_LOGIT_SEED";
/// Environment variable overriding the worker count.
pub const ENV_N_JOBS: &str = "GREEDY_LOGIT_N_JOBS";
/// Environment variable overriding the number of splits.
pub const ENV_CV_SPLITS: &str = "GREEDY_LOGIT_CV_SPLITS";

/// Everything one pipeline run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Training CSV with a header row and the label column
    pub train_path: PathBuf,
    /// Test CSV with a header row and the id column
    pub test_path: PathBuf,
    /// Submission CSV written at the end of the run
    pub submission_path: PathBuf,
    /// Score log, appended to once per run
    pub scores_path: PathBuf,
    /// Label column in the training file
    pub label_column: String,
    /// Id column in the test file
    pub id_column: String,
    /// Feature columns dropped from both files
    pub exclude_columns: Vec<String>,
    /// Interaction degrees appended after the raw columns
    pub interaction_degrees: Vec<usize>,
    /// Stratified shuffle splits per score
    pub cv_splits: usize,
    /// Held-out fraction per split
    pub cv_test_size: f64,
    /// Worker threads; 0 uses every core
    pub n_jobs: usize,
    /// Split seed used while selecting features
    pub seed: u64,
    /// Split seed used while sweeping `C`; not touched by the seed sweep
    pub sweep_seed: u64,
    /// `C` grid swept after selection
    pub c_grid: GridSpec,
    /// `C` used while selecting features
    pub initial_c: f64,
    /// L-BFGS iteration cap
    pub max_iter: usize,
    /// L-BFGS relative gradient tolerance
    pub tol: f64,
    /// Seeds run by the seed sweep
    pub seeds: Vec<u64>,
    /// Prefix of per-seed submission files
    pub submission_prefix: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            train_path: PathBuf::from("data/train.csv"),
            test_path: PathBuf::from("data/test.csv"),
            submission_path: PathBuf::from("submission.csv"),
            scores_path: PathBuf::from("scores.txt"),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            exclude_columns: Vec::new(),
            interaction_degrees: DEFAULT_INTERACTION_DEGREES.to_vec(),
            cv_splits: DEFAULT_CV_SPLITS,
            cv_test_size: DEFAULT_CV_TEST_SIZE,
            n_jobs: DEFAULT_N_JOBS,
            seed: DEFAULT_SEED,
            sweep_seed: DEFAULT_SEED,
            c_grid: GridSpec::default(),
            initial_c: DEFAULT_C,
            max_iter: DEFAULT_MAX_ITER,
            tol: DEFAULT_TOLERANCE,
            seeds: (DEFAULT_SEED_SWEEP.0..=DEFAULT_SEED_SWEEP.1).collect(),
            submission_prefix: "logistic_regression".to_string(),
        }
    }
}

impl PipelineConfig {
    /// Default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.label_column.is_empty() {
            return Err(GreedyLogitError::invalid_parameter(
                "label_column",
                "",
                "must not be empty",
            ));
        }
        if self.exclude_columns.contains(&self.label_column) {
            return Err(GreedyLogitError::invalid_parameter(
                "exclude_columns",
                format!("{:?}", self.exclude_columns),
                "must not contain the label column",
            ));
        }

        for &degree in &self.interaction_degrees {
            if degree < 2 {
                return Err(GreedyLogitError::invalid_parameter(
                    "interaction_degrees",
                    degree.to_string(),
                    "each degree must be at least 2",
                ));
            }
        }

        if self.cv_splits == 0 {
            return Err(GreedyLogitError::invalid_parameter(
                "cv_splits",
                "0",
                "must be at least 1",
            ));
        }
        if !(self.cv_test_size > 0.0 && self.cv_test_size < 1.0) {
            return Err(GreedyLogitError::invalid_parameter(
                "cv_test_size",
                self.cv_test_size.to_string(),
                "must be in (0, 1)",
            ));
        }

        self.c_grid.validate()?;

        if !(self.initial_c > 0.0 && self.initial_c.is_finite()) {
            return Err(GreedyLogitError::invalid_parameter(
                "initial_c",
                self.initial_c.to_string(),
                "must be positive and finite",
            ));
        }
        if self.max_iter == 0 {
            return Err(GreedyLogitError::invalid_parameter(
                "max_iter",
                "0",
                "must be at least 1",
            ));
        }
        if !(self.tol > 0.0 && self.tol.is_finite()) {
            return Err(GreedyLogitError::invalid_parameter(
                "tol",
                self.tol.to_string(),
                "must be positive and finite",
            ));
        }

        if self.submission_prefix.is_empty() {
            return Err(GreedyLogitError::invalid_parameter(
                "submission_prefix",
                "",
                "must not be empty",
            ));
        }

        Ok(())
    }

    /// Load configuration from a `.toml` or `.json` file.
    ///
    /// Keys missing from the file keep their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GreedyLogitError::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let config: PipelineConfig = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(GreedyLogitError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.toml` or `.json` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| GreedyLogitError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(GreedyLogitError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply overrides from any key lookup using the environment variable names.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup(ENV_TRAIN) {
            self.train_path = PathBuf::from(val);
        }
        if let Some(val) = lookup(ENV_TEST) {
            self.test_path = PathBuf::from(val);
        }
        if let Some(val) = lookup(ENV_SUBMIT) {
            self.submission_path = PathBuf::from(val);
        }
        if let Some(val) = lookup(ENV_SCORES) {
            self.scores_path = PathBuf::from(val);
        }
        if let Some(val) = lookup(ENV_SEED) {
            self.seed = parse_env(ENV_SEED, &val)?;
        }
        if let Some(val) = lookup(ENV_N_JOBS) {
            self.n_jobs = parse_env(ENV_N_JOBS, &val)?;
        }
        if let Some(val) = lookup(ENV_CV_SPLITS) {
            self.cv_splits = parse_env(ENV_CV_SPLITS, &val)?;
        }

        self.validate()
    }

    /// Copy of this configuration for one run of the seed sweep.
    ///
    /// Replaces `seed` and `submission_path`; the submission goes to
    /// `<prefix>_pred_<seed>.csv`. `sweep_seed` is kept.
    pub fn for_seed(&self, seed: u64) -> Self {
        PipelineConfig {
            seed,
            submission_path: PathBuf::from(format!("{}_pred_{}.csv", self.submission_prefix, seed)),
            ..self.clone()
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| GreedyLogitError::config(format!("Invalid {}: {:?}", key, value)))
}

/// Fluent builder for [`PipelineConfig`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    config: PipelineConfig,
}

impl ConfigBuilder {
    /// Start from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Training CSV path
    pub fn train_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.train_path = path.into();
        self
    }

    /// Test CSV path
    pub fn test_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.test_path = path.into();
        self
    }

    /// Submission output path
    pub fn submission_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.submission_path = path.into();
        self
    }

    /// Score log path
    pub fn scores_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.scores_path = path.into();
        self
    }

    /// Label column name
    pub fn label_column<S: Into<String>>(mut self, name: S) -> Self {
        self.config.label_column = name.into();
        self
    }

    /// Id column name
    pub fn id_column<S: Into<String>>(mut self, name: S) -> Self {
        self.config.id_column = name.into();
        self
    }

    /// Columns dropped from both files
    pub fn exclude_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.exclude_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Interaction degrees
    pub fn interaction_degrees(mut self, degrees: Vec<usize>) -> Self {
        self.config.interaction_degrees = degrees;
        self
    }

    /// Number of splits and held-out fraction
    pub fn cross_validation(mut self, splits: usize, test_size: f64) -> Self {
        self.config.cv_splits = splits;
        self.config.cv_test_size = test_size;
        self
    }

    /// Worker threads
    pub fn n_jobs(mut self, n_jobs: usize) -> Self {
        self.config.n_jobs = n_jobs;
        self
    }

    /// Split seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Split seed of the `C` sweep
    pub fn sweep_seed(mut self, seed: u64) -> Self {
        self.config.sweep_seed = seed;
        self
    }

    /// `C` grid
    pub fn c_grid(mut self, grid: GridSpec) -> Self {
        self.config.c_grid = grid;
        self
    }

    /// `C` used during feature selection
    pub fn initial_c(mut self, c: f64) -> Self {
        self.config.initial_c = c;
        self
    }

    /// Solver limits
    pub fn solver(mut self, max_iter: usize, tol: f64) -> Self {
        self.config.max_iter = max_iter;
        self.config.tol = tol;
        self
    }

    /// Seeds for the seed sweep
    pub fn seeds(mut self, seeds: Vec<u64>) -> Self {
        self.config.seeds = seeds;
        self
    }

    /// Prefix of per-seed submission files
    pub fn submission_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.submission_prefix = prefix.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.label_column, "ACTION");
        assert_eq!(config.interaction_degrees, vec![2, 3]);
        assert_eq!(config.cv_splits, 15);
        assert_eq!(config.seed, 25);
        assert_eq!(config.sweep_seed, DEFAULT_SEED);
        assert_eq!(config.seeds.len(), 20);
        assert_eq!(config.seeds[0], 1);
        assert!(config.exclude_columns.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = PipelineConfig::default();
        config.cv_test_size = 1.0;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.interaction_degrees = vec![1];
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.exclude_columns = vec!["ACTION".to_string()];
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.initial_c = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .train_path("a.csv")
            .exclude_columns(["ROLE_CODE"])
            .cross_validation(5, 0.2)
            .seed(7)
            .build()
            .unwrap();
        assert_eq!(config.train_path, PathBuf::from("a.csv"));
        assert_eq!(config.exclude_columns, vec!["ROLE_CODE".to_string()]);
        assert_eq!(config.cv_splits, 5);
        assert_eq!(config.seed, 7);

        assert!(ConfigBuilder::new().cross_validation(0, 0.1).build().is_err());
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempdir().unwrap();
        let config = ConfigBuilder::new().seed(3).n_jobs(2).build().unwrap();

        for name in ["config.toml", "config.json"] {
            let path = dir.path().join(name);
            config.save_to_file(&path).unwrap();
            assert_eq!(PipelineConfig::load_from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.toml");
        std::fs::write(&path, "seed = 11\nexclude_columns = [\"ROLE_CODE\"]\n").unwrap();

        let config = PipelineConfig::load_from_file(&path).unwrap();
        assert_eq!(config.seed, 11);
        assert_eq!(config.cv_splits, DEFAULT_CV_SPLITS);
        assert_eq!(config.exclude_columns, vec!["ROLE_CODE".to_string()]);
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "seed: 1").unwrap();
        assert!(PipelineConfig::load_from_file(&path).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            (ENV_TRAIN, "/tmp/train.csv"),
            (ENV_SEED, "42"),
            (ENV_N_JOBS, "8"),
        ]
        .into_iter()
        .collect();

        let mut config = PipelineConfig::default();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.train_path, PathBuf::from("/tmp/train.csv"));
        assert_eq!(config.seed, 42);
        assert_eq!(config.n_jobs, 8);
        assert_eq!(config.cv_splits, DEFAULT_CV_SPLITS);
    }

    #[test]
    fn test_invalid_override() {
        let mut config = PipelineConfig::default();
        let result = config.apply_overrides(|key| {
            (key == ENV_CV_SPLITS).then(|| "many".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_for_seed() {
        let config = PipelineConfig::default().for_seed(7);
        assert_eq!(config.seed, 7);
        assert_eq!(config.sweep_seed, 25);
        assert_eq!(
            config.submission_path,
            PathBuf::from("logistic_regression_pred_7.csv")
        );
    }
}
