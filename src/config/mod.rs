//! Layered migration configuration
//!
//! Layers merge in increasing precedence:
//! 1. Built-in defaults
//! 2. TOML files, in the order given
//! 3. Environment (`MONGEEZ_*`, `MONGODB_*`)
//! 4. Explicit `key=value` assignments

mod defaults;
mod effective;
mod merge;
mod resolver;
mod source;
mod stack;

pub use defaults::{keys, BuiltinDefaults};
pub use effective::{get_bool, get_port, get_text, parse_bool, ConfigError, EffectiveConfig};
pub use merge::{is_secret_key, merge_layers, MergedProperties, Property, REDACTED};
pub use resolver::{resolve, ConfigResolver, Resolution, SkipReason};
pub use source::{ConfigOrigin, ConfigSource};
pub use stack::LayerStack;
