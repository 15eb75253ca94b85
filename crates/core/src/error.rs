//! Error types for the morphon libraries.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for vocabulary building and alignment training.
#[derive(Error, Debug)]
pub enum MorphonError {
    /// I/O error with file context
    #[error("I/O error for {path}: {err}")]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Source and target corpora are not line-aligned
    #[error(
        "Corpus mismatch: source has {source_lines} lines but target has {target_lines} lines"
    )]
    CorpusMismatch {
        source_lines: usize,
        target_lines: usize,
    },

    /// No adjacent symbol pair exists to propose as a merge
    #[error("No merge candidates: vocabulary has no entry with two or more symbols")]
    NoCandidates,

    /// EM step requested before the translation table was initialized
    #[error("Translation table is not initialized")]
    NotInitialized,

    /// Expected-count accumulator built for a differently shaped table
    #[error("Expected counts do not match the translation table: {reason}")]
    CountsMismatch { reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl MorphonError {
    /// Wrap an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            err,
        }
    }
}

/// Result type alias for morphon operations.
pub type Result<T> = std::result::Result<T, MorphonError>;
