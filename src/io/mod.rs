//! Output files: the submission CSV and the appended score log.

pub mod submission;

pub use submission::{append_score_line, format_score_line, write_submission};
