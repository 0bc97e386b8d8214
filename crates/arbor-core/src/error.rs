use std::path::PathBuf;

use thiserror::Error;

/// Main error type for Arbor analysis operations
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Project folder missing: {0}")]
    ProjectFolderMissing(PathBuf),

    #[error("No code files found under {0}")]
    NoCodeFilesFound(PathBuf),

    #[error("Symbol provider unreachable: {0}")]
    ProviderUnreachable(String),

    #[error("Invalid graph mutation: {0}")]
    InvalidGraphMutation(String),

    #[error("Internal invariant violation: {0}")]
    InternalInvariantViolation(String),

    #[error("cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
