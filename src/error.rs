//! Error types for Pariksha

use std::path::PathBuf;

use thiserror::Error;

use crate::algorithms::matching::MatchError;

/// Pariksha error type
#[derive(Error, Debug)]
pub enum EvalError {
    /// Scan or pose source absent or empty. Fatal to the run.
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Trajectory mismatch: {poses} poses but {scans} scans")]
    TrajectoryMismatch { poses: usize, scans: usize },

    /// Pair rejected before any engine ran. The run continues.
    #[error("Invalid pair ({source_id}, {target_id}): {reason}")]
    InvalidPair {
        source_id: usize,
        target_id: usize,
        reason: String,
    },

    /// One engine produced no transform for one pair. The run continues.
    #[error("Engine '{engine}' failed on pair ({source_id}, {target_id}): {cause}")]
    EngineFailure {
        engine: String,
        source_id: usize,
        target_id: usize,
        #[source]
        cause: MatchError,
    },

    #[error("Unknown engine: {0}")]
    UnknownEngine(String),

    #[error("Duplicate engine name: {0}")]
    DuplicateEngine(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error in {}:{line}: {message}", file.display())]
    Parse {
        file: PathBuf,
        line: usize,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<basic_toml::Error> for EvalError {
    fn from(e: basic_toml::Error) -> Self {
        EvalError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
