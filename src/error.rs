//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O, fetch and JSON errors, and provides semantic variants
//! for target resolution and filtering failures.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crate::io::FetchError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid PDB identifier or file path: {target}")]
    InvalidTarget { target: String },

    #[error("No ATOM/HETATM records written from {input:?}; check input or filters")]
    EmptyResult { input: PathBuf },

    #[error("Batch file not found: {path:?}")]
    BatchFileNotFound { path: PathBuf },
}

impl Error {
    pub fn invalid_target<S: Into<String>>(target: S) -> Self {
        Error::InvalidTarget {
            target: target.into(),
        }
    }
}
