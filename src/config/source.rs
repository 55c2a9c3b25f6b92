//! Configuration layers
//!
//! A layer is a flat map of dotted keys to string values plus provenance
//! describing where it came from. Layers are built from TOML files, the
//! process environment, `key=value` assignments, or directly in code.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::Path;

use super::effective::ConfigError;

/// Environment variable prefixes that map onto recognized keys.
const ENV_PREFIXES: &[&str] = &["MONGEEZ_", "MONGODB_"];

/// Origin of a configuration layer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Builtin,
    File,
    Env,
    Cli,
    Inline,
    Connection,
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Builtin => "builtin",
            Self::File => "file",
            Self::Env => "env",
            Self::Cli => "cli",
            Self::Inline => "inline",
            Self::Connection => "connection",
        };
        f.write_str(name)
    }
}

/// One configuration layer with provenance
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConfigSource {
    /// Origin of this layer
    pub origin: ConfigOrigin,

    /// File path (None unless loaded from a file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None unless loaded from a file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Key/value entries
    #[serde(skip_serializing)]
    entries: BTreeMap<String, String>,
}

impl ConfigSource {
    /// Create an empty layer
    pub fn new(origin: ConfigOrigin) -> Self {
        Self {
            origin,
            path: None,
            digest: None,
            entries: BTreeMap::new(),
        }
    }

    /// Create an empty layer built in code
    pub fn inline() -> Self {
        Self::new(ConfigOrigin::Inline)
    }

    /// Build a layer from key/value pairs. A repeated key keeps its last value.
    pub fn from_pairs<I, K, V>(origin: ConfigOrigin, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut source = Self::new(origin);
        for (key, value) in pairs {
            source.insert(key, value);
        }
        source
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Parse `key:value` or `key=value` assignments into a CLI layer.
    ///
    /// The first separator splits key from value, so values may contain
    /// either character.
    pub fn from_assignments<I, S>(assignments: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut source = Self::new(ConfigOrigin::Cli);
        for assignment in assignments {
            let assignment = assignment.as_ref();
            let (key, value) = assignment
                .split_once(|c: char| c == ':' || c == '=')
                .ok_or_else(|| ConfigError::InvalidAssignment(assignment.to_string()))?;

            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::InvalidAssignment(assignment.to_string()));
            }
            source.insert(key, value.trim());
        }
        Ok(source)
    }

    /// Build an environment layer from the current process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_vars_os(std::env::vars_os())
    }

    /// Build an environment layer from raw OS variables.
    ///
    /// Names that are not UTF-8 or lack a recognized prefix are skipped. A
    /// recognized variable whose value is not UTF-8 is an error.
    pub fn from_env_vars_os<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut source = Self::new(ConfigOrigin::Env);
        for (name, value) in vars {
            let Some(name) = name.to_str() else {
                continue;
            };
            if !has_env_prefix(name) {
                continue;
            }

            let key = env_name_to_key(name);
            match value.into_string() {
                Ok(value) => source.insert(key, value),
                Err(raw) => {
                    return Err(ConfigError::InvalidType {
                        key,
                        value: raw.to_string_lossy().into_owned(),
                        expected: "UTF-8 string",
                    });
                }
            }
        }
        Ok(source)
    }

    /// Build an environment layer from explicit variables.
    ///
    /// Only `MONGEEZ_*` and `MONGODB_*` variables are kept; names are
    /// lowercased and `_` becomes `.` (`MONGEEZ_ENABLED` -> `mongeez.enabled`).
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut source = Self::new(ConfigOrigin::Env);
        for (name, value) in vars {
            let name = name.as_ref();
            if has_env_prefix(name) {
                source.insert(env_name_to_key(name), value);
            }
        }
        source
    }

    /// Parse TOML text into a layer, flattening tables into dotted keys
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(format!("TOML parse error: {}", e)))?;

        let mut source = Self::new(ConfigOrigin::File);
        flatten_table(&table, "", &mut source)?;
        Ok(source)
    }

    /// Load a TOML file as a layer, recording its path and digest
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| ConfigError::Parse(format!("Invalid UTF-8: {}", e)))?;

        let mut source = Self::from_toml_str(&contents)?;
        source.path = Some(path.to_string_lossy().to_string());
        source.digest = Some(digest);
        Ok(source)
    }
}

fn has_env_prefix(name: &str) -> bool {
    ENV_PREFIXES.iter().any(|p| name.starts_with(p))
}

fn env_name_to_key(name: &str) -> String {
    name.to_ascii_lowercase().replace('_', ".")
}

fn flatten_table(table: &toml::Table, prefix: &str, out: &mut ConfigSource) -> Result<(), ConfigError> {
    for (key, value) in table {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };

        match value {
            toml::Value::Table(nested) => flatten_table(nested, &path, out)?,
            toml::Value::String(s) => out.insert(path, s.clone()),
            toml::Value::Integer(i) => out.insert(path, i.to_string()),
            toml::Value::Float(f) => out.insert(path, f.to_string()),
            toml::Value::Boolean(b) => out.insert(path, b.to_string()),
            toml::Value::Array(_) | toml::Value::Datetime(_) => {
                return Err(ConfigError::Parse(format!(
                    "unsupported value type for '{}': {}",
                    path,
                    value.type_str()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_with_overwrites_within_layer() {
        let source = ConfigSource::inline()
            .with("mongeez.database", "foo")
            .with("mongeez.database", "bar");

        assert_eq!(source.get("mongeez.database"), Some("bar"));
        assert_eq!(source.len(), 1);
    }

    #[test]
    fn test_assignments_accept_both_separators() {
        let source =
            ConfigSource::from_assignments(["mongeez.enabled:false", "mongodb.database=foo"]).unwrap();

        assert_eq!(source.origin, ConfigOrigin::Cli);
        assert_eq!(source.get("mongeez.enabled"), Some("false"));
        assert_eq!(source.get("mongodb.database"), Some("foo"));
    }

    #[test]
    fn test_assignment_value_keeps_later_separators() {
        let source = ConfigSource::from_assignments(["mongeez.location=dir/a=b:c.xml"]).unwrap();
        assert_eq!(source.get("mongeez.location"), Some("dir/a=b:c.xml"));
    }

    #[test]
    fn test_assignment_without_separator_is_rejected() {
        let result = ConfigSource::from_assignments(["mongeez.enabled"]);
        assert!(matches!(result, Err(ConfigError::InvalidAssignment(ref a)) if a == "mongeez.enabled"));
    }

    #[test]
    fn test_assignment_with_empty_key_is_rejected() {
        let result = ConfigSource::from_assignments(["=foo"]);
        assert!(matches!(result, Err(ConfigError::InvalidAssignment(_))));
    }

    #[test]
    fn test_env_vars_are_filtered_and_mapped() {
        let source = ConfigSource::from_env_vars([
            ("MONGEEZ_ENABLED", "false"),
            ("MONGODB_DATABASE", "foo"),
            ("HOME", "/root"),
        ]);

        assert_eq!(source.origin, ConfigOrigin::Env);
        assert_eq!(source.len(), 2);
        assert_eq!(source.get("mongeez.enabled"), Some("false"));
        assert_eq!(source.get("mongodb.database"), Some("foo"));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_os_skips_unrelated_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![
            (OsString::from("UNRELATED_VAR"), OsString::from_vec(vec![0x66, 0xff, 0x6f])),
            (OsString::from_vec(vec![0x4d, 0xff]), OsString::from("x")),
            (OsString::from("MONGODB_DATABASE"), OsString::from("foo")),
        ];

        let source = ConfigSource::from_env_vars_os(vars).unwrap();
        assert_eq!(source.len(), 1);
        assert_eq!(source.get("mongodb.database"), Some("foo"));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_os_rejects_non_utf8_recognized_value() {
        use std::os::unix::ffi::OsStringExt;

        let vars = vec![(
            OsString::from("MONGEEZ_DATABASE"),
            OsString::from_vec(vec![0x66, 0xff, 0x6f]),
        )];

        let err = ConfigSource::from_env_vars_os(vars).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidType { ref key, expected: "UTF-8 string", .. } if key == "mongeez.database"
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_from_env_survives_non_utf8_process_variable() {
        use std::os::unix::ffi::OsStringExt;

        std::env::set_var("UNRELATED_SOURCE_TEST_VAR", OsString::from_vec(vec![0x66, 0xff, 0x6f]));

        let result = std::panic::catch_unwind(ConfigSource::from_env);
        std::env::remove_var("UNRELATED_SOURCE_TEST_VAR");

        let source = result.expect("reading the environment must not panic").unwrap();
        assert_eq!(source.origin, ConfigOrigin::Env);
    }

    #[test]
    fn test_toml_tables_flatten_to_dotted_keys() {
        let source = ConfigSource::from_toml_str(
            r#"
            [mongeez]
            enabled = true
            location = "db/changes.xml"

            [mongodb]
            database = "foo"
            port = 27018
            "#,
        )
        .unwrap();

        assert_eq!(source.get("mongeez.enabled"), Some("true"));
        assert_eq!(source.get("mongeez.location"), Some("db/changes.xml"));
        assert_eq!(source.get("mongodb.database"), Some("foo"));
        assert_eq!(source.get("mongodb.port"), Some("27018"));
    }

    #[test]
    fn test_toml_arrays_are_rejected() {
        let result = ConfigSource::from_toml_str("[mongeez]\nlocation = [\"a\", \"b\"]\n");
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("mongeez.location"));
    }

    #[test]
    fn test_toml_syntax_error() {
        let result = ConfigSource::from_toml_str("[mongeez\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_toml_file_records_provenance() {
        let mut temp = NamedTempFile::new().unwrap();
        writeln!(temp, "[mongeez]").unwrap();
        writeln!(temp, "database = \"bar\"").unwrap();

        let source = ConfigSource::from_toml_file(temp.path()).unwrap();

        assert_eq!(source.origin, ConfigOrigin::File);
        assert_eq!(source.get("mongeez.database"), Some("bar"));
        assert_eq!(source.path, Some(temp.path().to_string_lossy().to_string()));
        let digest = source.digest.unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_missing_toml_file() {
        let result = ConfigSource::from_toml_file(Path::new("does/not/exist.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
