//! Runner error types.

use std::path::PathBuf;

/// Errors raised while constructing or running a [`crate::Mongeez`].
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("Cannot find migration script at '{}'", .0.display())]
    LocationNotFound(PathBuf),

    #[error("No database name configured for migrations")]
    MissingDatabase,

    #[error("Migration failed: {0}")]
    Execution(String),
}
