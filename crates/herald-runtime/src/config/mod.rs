//! Configuration module for the herald runtime.
//!
//! Layered loading (defaults, files, environment, programmatic merges) of
//! the finder options and the logging setup, plus validation.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{HeraldConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig};
pub use validation::validate_config;
