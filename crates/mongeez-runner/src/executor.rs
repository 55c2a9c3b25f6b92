//! Execution seam for change-log processing.

use std::path::Path;

use crate::auth::MongoAuth;

/// Boxed error returned by executors.
pub type ExecutorError = Box<dyn std::error::Error + Send + Sync>;

/// Everything an executor needs to apply a change-log.
#[derive(Debug, Clone, Copy)]
pub struct MigrationRequest<'a> {
    /// Target database.
    pub db_name: &'a str,
    /// Change-log script.
    pub script: &'a Path,
    /// Optional credentials for the target database.
    pub auth: Option<&'a MongoAuth>,
}

/// Applies a change-log against a MongoDB deployment.
///
/// Implementations own the database client; the runner only decides when and
/// with which inputs they are invoked.
pub trait ChangeSetExecutor {
    fn execute(&self, request: &MigrationRequest<'_>) -> Result<(), ExecutorError>;
}
