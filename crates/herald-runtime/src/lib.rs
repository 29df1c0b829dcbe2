//! Herald Runtime - process wiring for the herald subscriber finder.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `HeraldConfig`)
//! - Logging initialization on top of `tracing-subscriber`
//! - `HeraldRuntime`, which owns a type registry and a finder built from configuration
//!
//! # Configuration
//!
//! Configuration is read from `herald.toml` / `herald.yaml` (feature-gated),
//! then `HERALD_*` environment variables:
//!
//! ```toml
//! [finder]
//! strict_verification = true
//! pool_size = 8
//!
//! [logging]
//! level = "debug"
//! span_events = { new = true, close = true }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use herald_runtime::HeraldRuntime;
//!
//! let runtime = HeraldRuntime::load()?;
//! let handlers = runtime.register::<SettingsScreen>()?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, HeraldConfig, LoggingConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::{HeraldRuntime, RuntimeBuilder, RuntimeStats};

// Re-export tracing for downstream crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::{ConfigLoader, HeraldConfig, LogLevel, load_config};
    pub use crate::error::{RuntimeError, RuntimeResult};
    pub use crate::runtime::HeraldRuntime;
}
