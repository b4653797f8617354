//! Submission and score-log writers.

use crate::core::constants::SUBMISSION_HEADER;
use crate::core::error::Result;
use crate::core::types::*;
use csv::WriterBuilder;
use ndarray::ArrayView1;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Write `id,ACTION` rows with 1-based ids and six-decimal probabilities.
pub fn write_submission<P: AsRef<Path>>(path: P, predictions: ArrayView1<'_, Score>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = WriterBuilder::new().from_path(path)?;
    writer.write_record(SUBMISSION_HEADER)?;

    for (i, p) in predictions.iter().enumerate() {
        writer.write_record(&[(i + 1).to_string(), format!("{:.6}", p)])?;
    }
    writer.flush()?;

    log::info!("Saved {} predictions to {}", predictions.len(), path.display());
    Ok(())
}

/// `<submission>: C=<c> AUC=<auc> [i, j, ...]`, without the trailing newline.
pub fn format_score_line(submission: &str, c: f64, auc: f64, features: &[FeatureIndex]) -> String {
    format!("{}: C={:.6} AUC={:.6} {:?}", submission, c, auc, features)
}

/// Append one run's result to the score log, creating the file if needed.
pub fn append_score_line<P: AsRef<Path>>(
    path: P,
    submission: &str,
    c: f64,
    auc: f64,
    features: &[FeatureIndex],
) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
    writeln!(file, "{}", format_score_line(submission, c, auc, features))?;
    Ok(())
}
