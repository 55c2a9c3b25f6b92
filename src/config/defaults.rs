//! Built-in defaults (lowest-precedence layer)
//!
//! Hardcoded defaults and the set of recognized keys.

use super::source::{ConfigOrigin, ConfigSource};

/// Recognized configuration keys
pub mod keys {
    /// Whether migrations run at all
    pub const ENABLED: &str = "mongeez.enabled";
    /// Database override for migrations
    pub const DATABASE: &str = "mongeez.database";
    /// Change-log script location
    pub const LOCATION: &str = "mongeez.location";
    pub const USERNAME: &str = "mongeez.username";
    pub const PASSWORD: &str = "mongeez.password";

    /// Database of the primary connection
    pub const MONGO_DATABASE: &str = "mongodb.database";
    pub const MONGO_HOST: &str = "mongodb.host";
    pub const MONGO_PORT: &str = "mongodb.port";
}

/// Built-in default configuration values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinDefaults {
    /// Migrations enabled (default: true)
    pub enabled: bool,

    /// Change-log script location (default: "db/mongeez.xml")
    pub location: String,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            enabled: true,
            location: "db/mongeez.xml".to_string(),
        }
    }
}

impl BuiltinDefaults {
    /// Convert to a layer for merging
    pub fn to_source(&self) -> ConfigSource {
        ConfigSource::new(ConfigOrigin::Builtin)
            .with(keys::ENABLED, self.enabled.to_string())
            .with(keys::LOCATION, self.location.clone())
    }
}
