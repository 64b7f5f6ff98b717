//! VR Tools Error Types
//!
//! Centralized error handling for host, panel and converter operations.

use thiserror::Error;

/// Central error type for VR Tools
#[derive(Error, Debug)]
pub enum VrError {
    #[error("Prim not found: {0}")]
    PrimNotFound(String),

    #[error("Path already exists: {0}")]
    PathExists(String),

    #[error("Invalid prim path: {0}")]
    InvalidPath(String),

    #[error("{0} path is not set")]
    PathNotSet(&'static str),

    #[error("Nothing is selected")]
    NoSelection,

    #[error("No material has been recorded")]
    NothingRecorded,

    #[error("'{0}' is not a candidate")]
    InvalidCandidate(String),

    #[error("'{0}' is not a source name in this match")]
    UnknownSource(String),

    #[error("Row {0} is out of range")]
    InvalidRow(usize),

    #[error("Not a convertible source file: {0}")]
    InvalidSource(String),

    #[error("Conversion failed with status {status}: {message}")]
    Conversion { status: i32, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for VR Tools operations
pub type VrResult<T> = Result<T, VrError>;
