//! Seed sweep over the Amazon Employee Access data.
//!
//! Runs the full pipeline once per configured seed, writing
//! `<prefix>_pred_<seed>.csv` and appending one line per seed to the score
//! log. Configuration comes from the defaults, the file named by
//! `GREEDY_LOGIT_CONFIG` and `GREEDY_LOGIT_*` overrides.

use anyhow::Context;
use greedy_logit::config::{load_seed_sweep_config, ConfigSource};
use greedy_logit::run_seed_sweep;

fn main() -> anyhow::Result<()> {
    greedy_logit::init();

    let (config, source) = load_seed_sweep_config().context("failed to load configuration")?;
    match &source {
        ConfigSource::File(path) => log::info!("Configuration file: {}", path),
        ConfigSource::Default => log::info!("Using default configuration"),
    }
    log::info!(
        "Train: {}, test: {}, seeds: {:?}",
        config.train_path.display(),
        config.test_path.display(),
        config.seeds
    );

    let summaries = run_seed_sweep(&config).context("seed sweep failed")?;

    let mean_auc = summaries.iter().map(|s| s.best_auc).sum::<f64>() / summaries.len() as f64;
    log::info!(
        "Finished {} seeds, mean best AUC {:.6}, scores in {}",
        summaries.len(),
        mean_auc,
        config.scores_path.display()
    );
    Ok(())
}
