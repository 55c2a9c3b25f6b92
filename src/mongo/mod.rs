//! Primary MongoDB connection settings
//!
//! Resolved from the same layers as the migration settings. Holding a
//! `MongoSettings` value is what "a connection is available" means to
//! the auto-configuration; its database is the fallback migration target.

use serde::Serialize;

use crate::config::{get_port, get_text, keys, merge_layers, ConfigError, ConfigSource};

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 27017;

/// Connection settings for the primary MongoDB deployment
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MongoSettings {
    /// Host name (default: "localhost")
    pub host: String,

    /// Port (default: 27017)
    pub port: u16,

    /// Database the connection is configured against
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: None,
        }
    }
}

impl MongoSettings {
    /// Resolve settings from ordered layers (last wins)
    pub fn from_sources(sources: &[ConfigSource]) -> Result<Self, ConfigError> {
        let merged = merge_layers(sources);

        Ok(Self {
            host: get_text(&merged, keys::MONGO_HOST)
                .unwrap_or(DEFAULT_HOST)
                .to_string(),
            port: get_port(&merged, keys::MONGO_PORT)?.unwrap_or(DEFAULT_PORT),
            database: get_text(&merged, keys::MONGO_DATABASE).map(str::to_string),
        })
    }

    /// `host:port`
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = MongoSettings::from_sources(&[]).unwrap();
        assert_eq!(settings, MongoSettings::default());
        assert_eq!(settings.address(), "localhost:27017");
    }

    #[test]
    fn test_layers_override() {
        let sources = [
            ConfigSource::inline()
                .with("mongodb.host", "db.internal")
                .with("mongodb.database", "foo"),
            ConfigSource::inline().with("mongodb.port", "27018"),
        ];

        let settings = MongoSettings::from_sources(&sources).unwrap();
        assert_eq!(settings.address(), "db.internal:27018");
        assert_eq!(settings.database.as_deref(), Some("foo"));
    }

    #[test]
    fn test_invalid_port() {
        let sources = [ConfigSource::inline().with("mongodb.port", "mongo")];
        let err = MongoSettings::from_sources(&sources).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidType { expected: "port number", .. }));
    }
}
