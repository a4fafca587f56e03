//! Output module for persisting scraped records
//!
//! This module handles:
//! - Naming run directories and files after the run timestamp
//! - Writing aggregate results as JSON or CSV
//! - Writing per-genre JSON files during genre runs
//! - Recording run statistics

mod persist;
mod stamp;
pub mod stats;

pub use persist::{persist_genre_results, persist_results};
pub use stamp::RunStamp;
pub use stats::{print_statistics, CrawlStatistics};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing result files
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type PersistResult<T> = Result<T, PersistError>;
