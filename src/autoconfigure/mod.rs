//! Explicit startup wiring for Mongeez
//!
//! Replaces conditional component registration with ordered code:
//! resolve the layered settings, stop quietly if there is nothing to do,
//! otherwise build the runner and let any construction failure abort
//! startup.

use std::path::{Path, PathBuf};

use mongeez_runner::{ChangeSetExecutor, Mongeez, RunnerError};

use crate::config::{
    keys, ConfigError, ConfigOrigin, ConfigResolver, ConfigSource, EffectiveConfig, MergedProperties, Resolution,
    SkipReason,
};
use crate::mongo::MongoSettings;

/// Auto-configuration errors
#[derive(Debug, thiserror::Error)]
pub enum AutoConfigError {
    #[error("Invalid mongeez configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to create mongeez runner: {0}")]
    Construction(#[from] RunnerError),

    #[error("Mongeez migration failed: {0}")]
    Migration(#[source] RunnerError),
}

/// Outcome of startup wiring
#[derive(Debug)]
pub enum Activation {
    /// Runner built and ready to process the change-log
    Ready(Mongeez),

    /// Migrations are not active for this startup
    Skipped(SkipReason),
}

impl Activation {
    pub fn into_runner(self) -> Option<Mongeez> {
        match self {
            Self::Ready(mongeez) => Some(mongeez),
            Self::Skipped(_) => None,
        }
    }
}

/// Builds a [`Mongeez`] runner when a connection exists and migrations are enabled
#[derive(Debug, Clone, Default)]
pub struct MongeezAutoConfiguration {
    sources: Vec<ConfigSource>,
    script_root: Option<PathBuf>,
    resolver: ConfigResolver,
}

impl MongeezAutoConfiguration {
    /// `sources` in increasing precedence
    pub fn new(sources: Vec<ConfigSource>) -> Self {
        Self {
            sources,
            ..Self::default()
        }
    }

    /// Resolve relative script locations against `root`
    pub fn with_script_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.script_root = Some(root.into());
        self
    }

    /// Use a custom resolver (e.g. different built-in defaults)
    pub fn with_resolver(mut self, resolver: ConfigResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Every layer in merge order: built-in defaults, the connection's
    /// database (when it names one), then the configured sources.
    ///
    /// Indices match [`crate::config::Property::layer`] in [`Self::merge`].
    pub fn layers(&self, connection: Option<&MongoSettings>) -> Vec<ConfigSource> {
        let mut layers = vec![self.resolver.builtin_layer()];
        layers.extend(self.stacked(connection));
        layers
    }

    /// Merged properties with provenance, as resolution sees them
    pub fn merge(&self, connection: Option<&MongoSettings>) -> MergedProperties {
        self.resolver.merge(&self.stacked(connection))
    }

    /// Resolve settings for the given connection.
    ///
    /// The connection's database sits below every configured layer, so
    /// `mongodb.database` or `mongeez.database` in any layer still wins.
    pub fn resolve(&self, connection: Option<&MongoSettings>) -> Result<Resolution, ConfigError> {
        self.resolver.resolve(&self.stacked(connection), connection.is_some())
    }

    /// Resolve and build the runner without executing it
    pub fn activate(&self, connection: Option<&MongoSettings>) -> Result<Activation, AutoConfigError> {
        let config = match self.resolve(connection)? {
            Resolution::Activate(config) => config,
            Resolution::Skip(reason) => {
                tracing::debug!(%reason, "mongeez not configured");
                return Ok(Activation::Skipped(reason));
            }
        };

        let mongeez = self.build_runner(&config)?;

        tracing::info!(
            database = %mongeez.db_name(),
            script = %mongeez.file().display(),
            address = %connection.map(MongoSettings::address).unwrap_or_default(),
            "mongeez runner configured"
        );

        Ok(Activation::Ready(mongeez))
    }

    /// Build the runner without executing it.
    ///
    /// `Ok(None)` means migrations are not active for this startup.
    pub fn configure(&self, connection: Option<&MongoSettings>) -> Result<Option<Mongeez>, AutoConfigError> {
        self.activate(connection).map(Activation::into_runner)
    }

    /// Build the runner and run the change-log through `executor`
    pub fn initialize(
        &self,
        connection: Option<&MongoSettings>,
        executor: &dyn ChangeSetExecutor,
    ) -> Result<Option<Mongeez>, AutoConfigError> {
        let Some(mongeez) = self.configure(connection)? else {
            return Ok(None);
        };

        mongeez.process(executor).map_err(AutoConfigError::Migration)?;
        Ok(Some(mongeez))
    }

    /// Script path after applying the script root
    pub fn script_path(&self, location: &str) -> PathBuf {
        let location = Path::new(location);
        match &self.script_root {
            Some(root) if location.is_relative() => root.join(location),
            _ => location.to_path_buf(),
        }
    }

    /// Connection layer plus configured sources, without the built-in layer
    fn stacked(&self, connection: Option<&MongoSettings>) -> Vec<ConfigSource> {
        let mut layers = Vec::with_capacity(self.sources.len() + 1);
        if let Some(database) = connection.and_then(|c| c.database.as_deref()) {
            layers.push(ConfigSource::new(ConfigOrigin::Connection).with(keys::MONGO_DATABASE, database));
        }
        layers.extend(self.sources.iter().cloned());
        layers
    }

    fn build_runner(&self, config: &EffectiveConfig) -> Result<Mongeez, RunnerError> {
        let mongeez = Mongeez::new(
            config.database_name.as_str(),
            self.script_path(&config.script_location),
        )?;

        Ok(match &config.auth {
            Some(auth) => mongeez.with_auth(auth.clone()),
            None => mongeez,
        })
    }
}
