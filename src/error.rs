//! Typed ingestion failures.
//!
//! All of these abort the whole ingestion run before anything is written
//! to the index.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Corpus root does not exist: {}", .0.display())]
    CorpusRootMissing(PathBuf),

    /// No matching documents under the root: a misconfigured location,
    /// not an empty document.
    #[error("No markdown files found in {}", .0.display())]
    EmptyCorpus(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid UTF-8: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Relative path '{0}' contains the reserved chunk id separator '::'")]
    InvalidPath(String),

    #[error("Failed to walk corpus: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] globset::Error),
}
