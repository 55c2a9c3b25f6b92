//! Layer stacking
//!
//! Collects configuration layers by kind and emits them in precedence order:
//! files (in the order added), then the environment, then assignments. The
//! order layers are added in does not change the result.

use std::path::Path;

use super::effective::ConfigError;
use super::source::ConfigSource;

/// Builder for an ordered list of configuration layers
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    files: Vec<ConfigSource>,
    env: Option<ConfigSource>,
    assignments: Option<ConfigSource>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a TOML file layer. Later files win over earlier ones.
    pub fn file(mut self, path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = %path.display(), "loading config file");
        self.files.push(ConfigSource::from_toml_file(path)?);
        Ok(self)
    }

    /// Set the environment layer. An empty layer is dropped.
    pub fn env(mut self, env: ConfigSource) -> Self {
        self.env = (!env.is_empty()).then_some(env);
        self
    }

    /// Parse `key=value` assignments into the highest-precedence layer
    pub fn assignments<I, S>(mut self, assignments: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let source = ConfigSource::from_assignments(assignments)?;
        self.assignments = (!source.is_empty()).then_some(source);
        Ok(self)
    }

    /// Layers in increasing precedence
    pub fn build(self) -> Vec<ConfigSource> {
        let mut layers = self.files;
        layers.extend(self.env);
        layers.extend(self.assignments);
        layers
    }
}
