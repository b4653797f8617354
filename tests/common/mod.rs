//! Common test utilities for greedy-logit integration tests.

#![allow(dead_code)]

use greedy_logit::ConfigBuilder;
use rand::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write a CSV file from a header and rows of cells.
pub fn write_csv<P: AsRef<Path>>(path: P, header: &[&str], rows: &[Vec<String>]) {
    let mut content = header.join(",");
    content.push('\n');
    for row in rows {
        content.push_str(&row.join(","));
        content.push('\n');
    }
    fs::write(path, content).unwrap();
}

/// Train/test files in a temporary directory, removed on drop.
pub struct TestFiles {
    pub dir: TempDir,
    pub train: PathBuf,
    pub test: PathBuf,
}

impl TestFiles {
    /// Write `train.csv` and `test.csv` into a fresh directory.
    pub fn new(
        train_header: &[&str],
        train_rows: &[Vec<String>],
        test_header: &[&str],
        test_rows: &[Vec<String>],
    ) -> Self {
        let dir = TempDir::new().unwrap();
        let train = dir.path().join("train.csv");
        let test = dir.path().join("test.csv");
        write_csv(&train, train_header, train_rows);
        write_csv(&test, test_header, test_rows);
        TestFiles { dir, train, test }
    }

    /// Path inside the temporary directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Configuration reading these files and writing outputs next to them.
    pub fn config(&self) -> ConfigBuilder {
        ConfigBuilder::new()
            .train_path(&self.train)
            .test_path(&self.test)
            .submission_path(self.path("submission.csv"))
            .scores_path(self.path("scores.txt"))
            .submission_prefix(self.path("run").to_string_lossy().to_string())
            .n_jobs(2)
    }
}

/// Rows as strings.
pub fn rows(values: &[&[i64]]) -> Vec<Vec<String>> {
    values
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect()
}

/// Amazon-shaped synthetic data: `ACTION` plus four categorical columns and
/// a trailing `ROLE_CODE` copy of `ROLE_TITLE`.
///
/// `RESOURCE` decides the label for most rows; the other columns are noise.
pub fn synthetic_amazon(n_train: usize, n_test: usize, seed: u64) -> TestFiles {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut make_row = |label: Option<i64>| -> (i64, Vec<i64>) {
        let resource: i64 = rng.gen_range(0..6);
        let action = match label {
            Some(l) => l,
            None => {
                let informative = if resource < 3 { 1 } else { 0 };
                if rng.gen_bool(0.9) {
                    informative
                } else {
                    1 - informative
                }
            }
        };
        let mgr: i64 = 100 + rng.gen_range(0..4);
        let dept: i64 = 200 + rng.gen_range(0..3);
        let title: i64 = 300 + rng.gen_range(0..5);
        (action, vec![resource, mgr, dept, title, title + 1000])
    };

    let train_rows: Vec<Vec<String>> = (0..n_train)
        .map(|_| {
            let (action, cells) = make_row(None);
            std::iter::once(action)
                .chain(cells)
                .map(|v| v.to_string())
                .collect()
        })
        .collect();
    let test_rows: Vec<Vec<String>> = (0..n_test)
        .map(|i| {
            let (_, cells) = make_row(Some(0));
            std::iter::once(i as i64 + 1)
                .chain(cells)
                .map(|v| v.to_string())
                .collect()
        })
        .collect();

    TestFiles::new(
        &["ACTION", "RESOURCE", "MGR_ID", "ROLE_DEPTNAME", "ROLE_TITLE", "ROLE_CODE"],
        &train_rows,
        &["id", "RESOURCE", "MGR_ID", "ROLE_DEPTNAME", "ROLE_TITLE", "ROLE_CODE"],
        &test_rows,
    )
}

/// Parse a submission file into `(id, probability)` pairs.
pub fn read_submission<P: AsRef<Path>>(path: P) -> Vec<(usize, f64)> {
    let content = fs::read_to_string(path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("id,ACTION"));
    lines
        .map(|line| {
            let (id, p) = line.split_once(',').unwrap();
            (id.parse().unwrap(), p.parse().unwrap())
        })
        .collect()
}
