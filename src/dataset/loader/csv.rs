//! CSV file loader for the train/test categorical tables.
//!
//! The training file carries the binary label column; the test file carries
//! an id column that is ignored. Feature columns are matched by header name,
//! so the two files may order their columns differently.

use crate::core::constants::{DEFAULT_ID_COLUMN, DEFAULT_LABEL_COLUMN};
use crate::core::error::{GreedyLogitError, Result};
use crate::core::types::*;
use crate::dataset::RawDataset;
use csv::{ReaderBuilder, StringRecord};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// CSV-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvConfig {
    /// Field delimiter
    pub delimiter: char,
    /// Quote character
    pub quote_char: char,
    /// Trim whitespace from fields
    pub trim: bool,
    /// Buffer size for reading
    pub buffer_size: usize,
}

impl Default for CsvConfig {
    fn default() -> Self {
        CsvConfig {
            delimiter: ',',
            quote_char: '"',
            trim: true,
            buffer_size: 8192,
        }
    }
}

/// A header plus its data records.
#[derive(Debug, Clone)]
pub struct CsvTable {
    /// Column names
    pub headers: Vec<String>,
    /// Data rows
    pub records: Vec<StringRecord>,
}

impl CsvTable {
    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Loader for the train/test pair.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    csv_config: CsvConfig,
    label_column: String,
    id_column: String,
    exclude_columns: Vec<String>,
}

impl Default for CsvLoader {
    fn default() -> Self {
        CsvLoader {
            csv_config: CsvConfig::default(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            id_column: DEFAULT_ID_COLUMN.to_string(),
            exclude_columns: Vec::new(),
        }
    }
}

impl CsvLoader {
    /// Create a loader with the default column names
    pub fn new() -> Self {
        Self::default()
    }

    /// Create CSV loader with custom configuration
    pub fn with_csv_config(mut self, csv_config: CsvConfig) -> Self {
        self.csv_config = csv_config;
        self
    }

    /// Set the label column of the training file
    pub fn with_label_column<S: Into<String>>(mut self, name: S) -> Self {
        self.label_column = name.into();
        self
    }

    /// Set the id column of the test file
    pub fn with_id_column<S: Into<String>>(mut self, name: S) -> Self {
        self.id_column = name.into();
        self
    }

    /// Drop these feature columns from both files
    pub fn with_exclude_columns(mut self, columns: Vec<String>) -> Self {
        self.exclude_columns = columns;
        self
    }

    /// Read a whole CSV file with a header row.
    pub fn read_table<P: AsRef<Path>>(&self, path: P) -> Result<CsvTable> {
        let path = path.as_ref();
        log::debug!("Reading CSV file: {}", path.display());

        if !path.is_file() {
            return Err(GreedyLogitError::data_loading(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        let file = File::open(path).map_err(|e| {
            GreedyLogitError::data_loading(format!("Failed to open file {}: {}", path.display(), e))
        })?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.csv_config.delimiter as u8)
            .quote(self.csv_config.quote_char as u8)
            .has_headers(true)
            .trim(if self.csv_config.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .buffer_capacity(self.csv_config.buffer_size)
            .from_reader(file);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() {
            return Err(GreedyLogitError::data_loading(format!(
                "{} has no header",
                path.display()
            )));
        }

        let mut records = Vec::new();
        for (line_num, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                GreedyLogitError::data_loading(format!(
                    "CSV parsing error in {} at line {}: {}",
                    path.display(),
                    line_num + 2,
                    e
                ))
            })?;
            records.push(record);
        }

        log::info!(
            "Loaded {} rows with {} columns from {}",
            records.len(),
            headers.len(),
            path.display()
        );
        Ok(CsvTable { headers, records })
    }

    /// Load the training and test files into a [`RawDataset`].
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(&self, train: P, test: Q) -> Result<RawDataset> {
        let train_table = self.read_table(train)?;
        let test_table = self.read_table(test)?;

        let label_idx = train_table.column_index(&self.label_column).ok_or_else(|| {
            GreedyLogitError::data_loading(format!(
                "Training file has no label column '{}'",
                self.label_column
            ))
        })?;

        let feature_names: Vec<String> = train_table
            .headers
            .iter()
            .enumerate()
            .filter(|(i, name)| *i != label_idx && !self.exclude_columns.contains(*name))
            .map(|(_, name)| name.clone())
            .collect();

        for name in &self.exclude_columns {
            if train_table.column_index(name).is_none() {
                log::warn!("Excluded column '{}' is not in the training file", name);
            }
        }

        let train_positions: Vec<usize> = feature_names
            .iter()
            .filter_map(|name| train_table.column_index(name))
            .collect();
        let test_positions = feature_names
            .iter()
            .map(|name| {
                test_table.column_index(name).ok_or_else(|| {
                    GreedyLogitError::data_loading(format!(
                        "Test file has no feature column '{}'",
                        name
                    ))
                })
            })
            .collect::<Result<Vec<usize>>>()?;

        if test_table.column_index(&self.id_column).is_none() {
            log::debug!("Test file has no id column '{}'", self.id_column);
        }

        let train = parse_categories(&train_table.records, &train_positions)?;
        let test = parse_categories(&test_table.records, &test_positions)?;
        let labels = parse_labels(&train_table.records, label_idx)?;

        RawDataset::new(train, test, labels, feature_names)
    }
}

/// Parse a categorical cell: integers are kept, anything else is hashed.
pub fn parse_category(cell: &str) -> Category {
    cell.parse::<Category>().unwrap_or_else(|_| hash_text(cell))
}

fn parse_categories(records: &[StringRecord], positions: &[usize]) -> Result<Array2<Category>> {
    let mut data = Array2::zeros((records.len(), positions.len()));
    for (i, record) in records.iter().enumerate() {
        for (j, &pos) in positions.iter().enumerate() {
            let cell = record.get(pos).ok_or_else(|| {
                GreedyLogitError::data_loading(format!(
                    "Row {} has {} fields, expected at least {}",
                    i + 1,
                    record.len(),
                    pos + 1
                ))
            })?;
            data[[i, j]] = parse_category(cell);
        }
    }
    Ok(data)
}

fn parse_labels(records: &[StringRecord], label_idx: usize) -> Result<Array1<Label>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let cell = record.get(label_idx).unwrap_or("");
            match cell.parse::<f64>() {
                Ok(v) if v == 0.0 || v == 1.0 => Ok(v),
                _ => Err(GreedyLogitError::data_loading(format!(
                    "Row {} has non-binary label '{}'",
                    i + 1,
                    cell
                ))),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_matches_columns_by_name() {
        let dir = TempDir::new().unwrap();
        let train = write(&dir, "train.csv", "ACTION,A,B\n1,10,x\n0,11,y\n");
        let test = write(&dir, "test.csv", "id,B,A\n1,y,12\n");

        let data = CsvLoader::new().load(&train, &test).unwrap();
        assert_eq!(data.feature_names(), &["A".to_string(), "B".to_string()]);
        assert_eq!(data.num_train(), 2);
        assert_eq!(data.num_test(), 1);
        assert_eq!(data.labels().to_vec(), vec![1.0, 0.0]);
        assert_eq!(data.train()[[0, 0]], 10);
        assert_eq!(data.test()[[0, 0]], 12);
        assert_eq!(data.test()[[0, 1]], hash_text("y"));
        assert_eq!(data.train()[[1, 1]], data.test()[[0, 1]]);
    }

    #[test]
    fn test_exclude_columns() {
        let dir = TempDir::new().unwrap();
        let train = write(&dir, "train.csv", "ACTION,A,B,ROLE_CODE\n1,1,2,3\n0,1,2,3\n");
        let test = write(&dir, "test.csv", "id,A,B,ROLE_CODE\n1,1,2,3\n");

        let data = CsvLoader::new()
            .with_exclude_columns(vec!["ROLE_CODE".to_string()])
            .load(&train, &test)
            .unwrap();
        assert_eq!(data.num_features(), 2);
    }

    #[test]
    fn test_custom_delimiter() {
        let dir = TempDir::new().unwrap();
        let train = write(&dir, "train.csv", "ACTION;A;B\n1;10; 7\n0;11;8\n");
        let test = write(&dir, "test.csv", "id;A;B\n1;12;9\n");

        let loader = CsvLoader::new().with_csv_config(CsvConfig {
            delimiter: ';',
            ..CsvConfig::default()
        });
        let data = loader.load(&train, &test).unwrap();
        assert_eq!(data.num_features(), 2);
        assert_eq!(data.train()[[0, 1]], 7);
        assert_eq!(data.test()[[0, 0]], 12);

        // The default comma delimiter sees a single column.
        assert!(CsvLoader::new().load(&train, &test).is_err());
    }

    #[test]
    fn test_missing_label_column() {
        let dir = TempDir::new().unwrap();
        let train = write(&dir, "train.csv", "A,B\n1,2\n");
        let test = write(&dir, "test.csv", "id,A,B\n1,1,2\n");
        assert!(CsvLoader::new().load(&train, &test).is_err());
    }

    #[test]
    fn test_missing_test_column() {
        let dir = TempDir::new().unwrap();
        let train = write(&dir, "train.csv", "ACTION,A,B\n1,1,2\n0,1,2\n");
        let test = write(&dir, "test.csv", "id,A\n1,1\n");
        assert!(CsvLoader::new().load(&train, &test).is_err());
    }

    #[test]
    fn test_non_binary_label() {
        let dir = TempDir::new().unwrap();
        let train = write(&dir, "train.csv", "ACTION,A\n2,1\n");
        let test = write(&dir, "test.csv", "id,A\n1,1\n");
        let err = CsvLoader::new().load(&train, &test).unwrap_err();
        assert_eq!(err.category(), "data_loading");
    }

    #[test]
    fn test_missing_file() {
        let err = CsvLoader::new()
            .read_table("/definitely/not/here.csv")
            .unwrap_err();
        assert_eq!(err.category(), "data_loading");
    }
}
