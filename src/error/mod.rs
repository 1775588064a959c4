use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error taxonomy for the benchmark harness.
///
/// Configuration and session errors are fatal for the dataset being
/// benchmarked; the harness skips to the next dataset. Data-quality
/// conditions (missing fields, unseen labels) are handled by policy in
/// the filter and pipeline stages and never surface here.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("compute session error: {0}")]
    Session(String),

    #[error("dataset not found: {0}")]
    DatasetNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for benchmark operations.
pub type BenchResult<T> = Result<T, BenchError>;
