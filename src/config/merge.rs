//! Configuration merge logic
//!
//! Layers are merged flat and per key:
//! - A later layer overwrites any key it defines (last wins)
//! - A key absent from a later layer keeps its earlier value
//! - Values are opaque strings; nothing is merged structurally

use serde::Serialize;
use std::collections::BTreeMap;

use super::source::{ConfigOrigin, ConfigSource};

/// Key fragments whose values are never shown
const SECRET_KEYS: &[&str] = &["password", "secret", "token", "credential"];

/// Placeholder for redacted values
pub const REDACTED: &str = "[REDACTED]";

/// Whether a key holds a secret (case-insensitive substring match)
pub fn is_secret_key(key: &str) -> bool {
    let key_lower = key.to_lowercase();
    SECRET_KEYS.iter().any(|s| key_lower.contains(s))
}

/// A merged value and the layer it came from
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Property {
    pub value: String,

    /// Origin of the winning layer
    pub origin: ConfigOrigin,

    /// Index of the winning layer in merge order
    pub layer: usize,
}

/// Result of merging layers, keyed by dotted key
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct MergedProperties {
    entries: BTreeMap<String, Property>,
}

impl MergedProperties {
    pub fn get(&self, key: &str) -> Option<&Property> {
        self.entries.get(key)
    }

    /// Merged value for `key`
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).map(|p| p.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Property)> {
        self.entries.iter().map(|(k, p)| (k.as_str(), p))
    }

    /// Copy safe for display, with secret values replaced by `[REDACTED]`.
    /// Provenance is kept.
    pub fn redacted(&self) -> Self {
        let mut redacted = self.clone();
        for (key, property) in redacted.entries.iter_mut() {
            if is_secret_key(key) {
                property.value = REDACTED.to_string();
            }
        }
        redacted
    }

    /// Overlay one layer on top of what has been merged so far
    fn apply(&mut self, index: usize, source: &ConfigSource) {
        for (key, value) in source.entries() {
            self.entries.insert(
                key.to_string(),
                Property {
                    value: value.to_string(),
                    origin: source.origin,
                    layer: index,
                },
            );
        }
    }
}

/// Merge layers in order (first is base, last has highest precedence)
pub fn merge_layers<'a, I>(layers: I) -> MergedProperties
where
    I: IntoIterator<Item = &'a ConfigSource>,
{
    let mut merged = MergedProperties::default();
    for (index, source) in layers.into_iter().enumerate() {
        merged.apply(index, source);
    }
    merged
}
