//! Activation decision and effective value resolution
//!
//! Resolution is a pure function over a snapshot of layers. It answers two
//! questions in order: should migrations run at all, and if so, with which
//! database, script and credentials. The second question is never asked when
//! the first answer is no.

use mongeez_runner::MongoAuth;
use serde::Serialize;

use super::defaults::{keys, BuiltinDefaults};
use super::effective::{get_bool, get_text, ConfigError, EffectiveConfig};
use super::merge::{merge_layers, MergedProperties};
use super::source::{ConfigOrigin, ConfigSource};

/// Why migrations were not activated
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// No database connection is available
    NoConnection,

    /// `mongeez.enabled` resolved to false
    Disabled { origin: ConfigOrigin },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoConnection => write!(f, "no database connection available"),
            Self::Disabled { origin } => write!(f, "disabled by {} configuration", origin),
        }
    }
}

/// Outcome of a resolution
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum Resolution {
    Activate(EffectiveConfig),
    Skip(SkipReason),
}

impl Resolution {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip(_))
    }

    /// The effective config, if activated
    pub fn config(&self) -> Option<&EffectiveConfig> {
        match self {
            Self::Activate(config) => Some(config),
            Self::Skip(_) => None,
        }
    }

    pub fn into_config(self) -> Option<EffectiveConfig> {
        match self {
            Self::Activate(config) => Some(config),
            Self::Skip(_) => None,
        }
    }
}

/// Resolves migration settings from ordered layers.
///
/// The built-in defaults are always the lowest-precedence layer; `sources`
/// follow in increasing precedence.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    defaults: BuiltinDefaults,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use different built-in defaults
    pub fn with_defaults(defaults: BuiltinDefaults) -> Self {
        Self { defaults }
    }

    /// The lowest-precedence layer, index 0 in every merge
    pub fn builtin_layer(&self) -> ConfigSource {
        self.defaults.to_source()
    }

    /// Merge the defaults and `sources` without making any decision
    pub fn merge(&self, sources: &[ConfigSource]) -> MergedProperties {
        let builtin = self.builtin_layer();
        merge_layers(std::iter::once(&builtin).chain(sources))
    }

    /// Decide whether migrations activate and, if so, with what settings.
    pub fn resolve(&self, sources: &[ConfigSource], has_connection: bool) -> Result<Resolution, ConfigError> {
        if !has_connection {
            tracing::debug!("mongeez skipped: no database connection");
            return Ok(Resolution::Skip(SkipReason::NoConnection));
        }

        let merged = self.merge(sources);

        let enabled = get_bool(&merged, keys::ENABLED)?.unwrap_or(true);
        if !enabled {
            let origin = merged
                .get(keys::ENABLED)
                .map(|p| p.origin)
                .unwrap_or(ConfigOrigin::Builtin);
            tracing::debug!(%origin, "mongeez skipped: disabled");
            return Ok(Resolution::Skip(SkipReason::Disabled { origin }));
        }

        let database_name = resolve_database(&merged);
        let script_location = merged.value(keys::LOCATION).unwrap_or_default().to_string();
        let auth = resolve_auth(&merged)?;

        Ok(Resolution::Activate(EffectiveConfig {
            enabled,
            database_name,
            script_location,
            auth,
        }))
    }
}

/// Resolve with the standard built-in defaults
pub fn resolve(sources: &[ConfigSource], has_connection: bool) -> Result<Resolution, ConfigError> {
    ConfigResolver::new().resolve(sources, has_connection)
}

fn resolve_database(merged: &MergedProperties) -> String {
    if let Some(database) = get_text(merged, keys::DATABASE) {
        return database.to_string();
    }

    if merged.get(keys::DATABASE).is_some() {
        tracing::warn!(
            "ignoring blank {} override, falling back to {}",
            keys::DATABASE,
            keys::MONGO_DATABASE
        );
    }

    get_text(merged, keys::MONGO_DATABASE)
        .unwrap_or_default()
        .to_string()
}

fn resolve_auth(merged: &MergedProperties) -> Result<Option<MongoAuth>, ConfigError> {
    let username = get_text(merged, keys::USERNAME);
    let password = merged.value(keys::PASSWORD).filter(|p| !p.is_empty());

    match (username, password) {
        (Some(username), Some(password)) => Ok(Some(MongoAuth::new(username, password))),
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::IncompleteCredentials {
            present: keys::USERNAME,
            missing: keys::PASSWORD,
        }),
        (None, Some(_)) => Err(ConfigError::IncompleteCredentials {
            present: keys::PASSWORD,
            missing: keys::USERNAME,
        }),
    }
}
