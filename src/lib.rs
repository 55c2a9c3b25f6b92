//! Mongeez auto-configuration
//!
//! Decides at startup whether MongoDB schema migrations should run and, if
//! so, builds a [`Mongeez`] runner from layered configuration. A bad script
//! location fails construction immediately.

pub mod autoconfigure;
pub mod config;
pub mod logging;
pub mod mongo;

pub use autoconfigure::{Activation, AutoConfigError, MongeezAutoConfiguration};
pub use config::{
    ConfigError, ConfigOrigin, ConfigResolver, ConfigSource, EffectiveConfig, LayerStack, Resolution, SkipReason,
};
pub use mongeez_runner::{ChangeSetExecutor, ExecutorError, MigrationRequest, MongoAuth, Mongeez, RunnerError};
pub use mongo::MongoSettings;
