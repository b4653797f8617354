//! Data loaders.

pub mod csv;

pub use self::csv::{parse_category, CsvConfig, CsvLoader, CsvTable};
