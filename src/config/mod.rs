//! Configuration management for greedy-logit.
//!
//! A [`PipelineConfig`] is assembled in layers: built-in defaults, then an
//! optional TOML or JSON file, then `GREEDY_LOGIT_*` environment overrides.

pub mod core;

pub use self::core::{
    ConfigBuilder, PipelineConfig, ENV_CV_SPLITS, ENV_N_JOBS, ENV_SCORES, ENV_SEED, ENV_SUBMIT,
    ENV_TEST, ENV_TRAIN,
};

use crate::core::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a configuration file.
pub const CONFIG_FILE_ENV: &str = "GREEDY_LOGIT_CONFIG";

/// Columns the seed sweep drops when no configuration file is given.
///
/// `ROLE_CODE` duplicates `ROLE_TITLE` one-to-one in the Amazon data.
pub const SEED_SWEEP_EXCLUDED_COLUMNS: [&str; 1] = ["ROLE_CODE"];

/// Overrides the seed sweep replaces on every run.
pub const SEED_SWEEP_REPLACED_OVERRIDES: [&str; 2] = [ENV_SEED, ENV_SUBMIT];

/// Where a configuration came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Built-in defaults
    Default,
    /// Configuration file
    File(String),
}

/// Build the configuration used by the seed sweep.
///
/// Reads the file named by `GREEDY_LOGIT_CONFIG` when set, otherwise starts
/// from the defaults with [`SEED_SWEEP_EXCLUDED_COLUMNS`] dropped, and then
/// applies environment overrides.
///
/// `GREEDY_LOGIT_SEED` and `GREEDY_LOGIT_SUBMIT` have no effect here: every
/// run of the sweep takes its seed from `seeds` and writes to
/// `<submission_prefix>_pred_<seed>.csv`. A warning is logged when either
/// is set.
pub fn load_seed_sweep_config() -> Result<(PipelineConfig, ConfigSource)> {
    let config_file = std::env::var(CONFIG_FILE_ENV).ok();
    load_layered(config_file.as_deref(), |key| std::env::var(key).ok())
}

/// Layered loading with an explicit file and override lookup.
pub fn load_layered<F>(config_file: Option<&str>, lookup: F) -> Result<(PipelineConfig, ConfigSource)>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, source) = match config_file {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            (
                PipelineConfig::load_from_file(Path::new(path))?,
                ConfigSource::File(path.to_string()),
            )
        }
        None => (
            ConfigBuilder::new()
                .exclude_columns(SEED_SWEEP_EXCLUDED_COLUMNS)
                .build()?,
            ConfigSource::Default,
        ),
    };

    for key in replaced_overrides(&lookup) {
        log::warn!("{} is ignored by the seed sweep", key);
    }

    config.apply_overrides(lookup)?;
    Ok((config, source))
}

/// Overrides that are set but replaced per seed by [`PipelineConfig::for_seed`].
pub fn replaced_overrides<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    SEED_SWEEP_REPLACED_OVERRIDES
        .into_iter()
        .filter(|key| lookup(key).is_some())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_layer_drops_role_code() {
        let (config, source) = load_layered(None, |_| None).unwrap();
        assert_eq!(source, ConfigSource::Default);
        assert_eq!(config.exclude_columns, vec!["ROLE_CODE".to_string()]);
    }

    #[test]
    fn test_file_layer_then_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.json");
        std::fs::write(&path, r#"{"cv_splits": 3, "seed": 9}"#).unwrap();

        let path_str = path.to_string_lossy().to_string();
        let (config, source) = load_layered(Some(&path_str), |key| {
            (key == ENV_SEED).then(|| "10".to_string())
        })
        .unwrap();

        assert_eq!(source, ConfigSource::File(path_str.clone()));
        assert_eq!(config.cv_splits, 3);
        assert_eq!(config.seed, 10);
        assert!(config.exclude_columns.is_empty());
    }

    #[test]
    fn test_replaced_overrides_are_reported() {
        assert!(replaced_overrides(|_| None).is_empty());

        let found = replaced_overrides(|key| {
            (key == ENV_SUBMIT || key == ENV_N_JOBS).then(|| "x".to_string())
        });
        assert_eq!(found, vec![ENV_SUBMIT]);

        let (config, _) = load_layered(None, |key| {
            (key == ENV_SEED).then(|| "3".to_string())
        })
        .unwrap();
        // Accepted, then replaced by every run of the sweep.
        assert_eq!(config.seed, 3);
        assert_eq!(config.for_seed(1).seed, 1);
    }
}
