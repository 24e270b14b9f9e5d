//! Error types for the import checker

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the import checker
pub type Result<T> = std::result::Result<T, CheckError>;

/// Errors raised while checking one notebook
#[derive(Error, Debug)]
pub enum CheckError {
    /// Reading a file failed
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The notebook is not valid notebook JSON
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The scratch file could not be written
    #[error("cannot write scratch file: {0}")]
    Scratch(#[source] io::Error),

    /// The import sorter could not be run
    #[error("cannot run {program}: {source}")]
    Sorter {
        program: String,
        #[source]
        source: io::Error,
    },
}
