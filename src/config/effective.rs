//! Effective migration configuration
//!
//! The values a runner is built from once resolution decides to activate,
//! plus the coercions applied to raw string values.

use mongeez_runner::MongoAuth;
use serde::Serialize;

use super::merge::MergedProperties;

/// Resolved migration settings
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EffectiveConfig {
    /// Always true for an activated resolution
    pub enabled: bool,

    /// Target database; empty when neither override nor connection names one
    pub database_name: String,

    /// Change-log script location as configured
    pub script_location: String,

    /// Credentials for the target database
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<MongoAuth>,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for '{key}': '{value}' is not a valid {expected}")]
    InvalidType {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("Invalid assignment '{0}': expected KEY=VALUE or KEY:VALUE")]
    InvalidAssignment(String),

    #[error("Incomplete credentials: '{present}' is set but '{missing}' is not")]
    IncompleteCredentials {
        present: &'static str,
        missing: &'static str,
    },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Parse a boolean the way property files spell them.
///
/// Accepts `true/false`, `yes/no`, `on/off` and `1/0`, trimmed and
/// case-insensitive.
pub fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidType {
            key: key.to_string(),
            value: raw.to_string(),
            expected: "boolean",
        }),
    }
}

/// Read an optional boolean from merged properties
pub fn get_bool(properties: &MergedProperties, key: &str) -> Result<Option<bool>, ConfigError> {
    properties.value(key).map(|raw| parse_bool(key, raw)).transpose()
}

/// Read an optional port number from merged properties
pub fn get_port(properties: &MergedProperties, key: &str) -> Result<Option<u16>, ConfigError> {
    properties
        .value(key)
        .map(|raw| {
            raw.trim().parse::<u16>().map_err(|_| ConfigError::InvalidType {
                key: key.to_string(),
                value: raw.to_string(),
                expected: "port number",
            })
        })
        .transpose()
}

/// Read a trimmed string that counts as absent when blank
pub fn get_text<'a>(properties: &'a MergedProperties, key: &str) -> Option<&'a str> {
    properties.value(key).map(str::trim).filter(|v| !v.is_empty())
}
