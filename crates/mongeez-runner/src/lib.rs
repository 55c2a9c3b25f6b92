//! Mongeez migration runner.
//!
//! A `Mongeez` value is the handle an application holds once migrations are
//! configured: a target database, a change-log script and optional
//! credentials. Construction validates the script location eagerly so a bad
//! location aborts startup instead of surfacing on first use. Executing the
//! change-log is delegated to a [`ChangeSetExecutor`].

mod auth;
mod error;
mod executor;

pub use auth::MongoAuth;
pub use error::RunnerError;
pub use executor::{ChangeSetExecutor, ExecutorError, MigrationRequest};

use std::path::{Path, PathBuf};

/// A configured migration runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mongeez {
    db_name: String,
    file: PathBuf,
    auth: Option<MongoAuth>,
}

impl Mongeez {
    /// Create a runner for `db_name` using the change-log at `file`.
    ///
    /// Fails with [`RunnerError::LocationNotFound`] if `file` is not an
    /// existing regular file, and with [`RunnerError::MissingDatabase`] if
    /// `db_name` is blank.
    pub fn new(db_name: impl Into<String>, file: impl Into<PathBuf>) -> Result<Self, RunnerError> {
        let db_name = db_name.into();
        let file = file.into();

        if !file.is_file() {
            return Err(RunnerError::LocationNotFound(file));
        }
        if db_name.trim().is_empty() {
            return Err(RunnerError::MissingDatabase);
        }

        Ok(Self {
            db_name,
            file,
            auth: None,
        })
    }

    /// Attach credentials used when connecting to the target database.
    pub fn with_auth(mut self, auth: MongoAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Target database name.
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// Change-log script path.
    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn auth(&self) -> Option<&MongoAuth> {
        self.auth.as_ref()
    }

    /// Run the change-log through `executor`.
    pub fn process(&self, executor: &dyn ChangeSetExecutor) -> Result<(), RunnerError> {
        let request = MigrationRequest {
            db_name: &self.db_name,
            script: &self.file,
            auth: self.auth.as_ref(),
        };

        tracing::info!(
            database = %self.db_name,
            script = %self.file.display(),
            "running mongeez change-log"
        );

        executor
            .execute(&request)
            .map_err(|e| RunnerError::Execution(e.to_string()))
    }
}
