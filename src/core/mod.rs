//! Core infrastructure module for greedy-logit.
//!
//! - [`types`]: category, score and label types plus stable hashing
//! - [`constants`]: pipeline defaults
//! - [`error`]: the library error type
//! - [`traits`]: classifier abstractions used by cross-validation

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use constants::*;
pub use error::{GreedyLogitError, Result};
pub use traits::*;
pub use types::*;

/// Initialize logging if not already done.
///
/// Defaults to the `info` level when `RUST_LOG` is unset. Safe to call more
/// than once.
pub fn initialize_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    // Ignore the error raised when a logger is already installed.
    let _ = env_logger::Builder::from_env(env).try_init();
}
