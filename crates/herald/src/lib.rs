//! # Herald
//!
//! Resolves the handler methods of event bus subscribers.
//!
//! ## Overview
//!
//! A subscriber is a struct whose methods are marked with `#[subscribe]`.
//! Given a subscriber type, herald walks the type and its ancestors (parent
//! fields marked `#[subscriber(parent)]`) and returns every handler method,
//! most-derived first, with overridden handlers dropped. Results are cached
//! per type.
//!
//! ```text
//! ┌────────────┐     ┌────────────────────────┐     ┌─────────────────┐
//! │  Runtime   │────▶│ SubscriberMethodFinder │────▶│ generated index │
//! │ (registry) │     │ (cache + state pool)   │────▶│ type registry   │
//! └────────────┘     └────────────────────────┘     └─────────────────┘
//! ```
//!
//! - **Runtime**: Configuration, logging and the type registry
//! - **Finder**: Hierarchy walk, override resolution and caching
//! - **Indexes**: Tables built at compile time by `#[handlers(index)]`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! pub struct ThemeChanged;
//!
//! #[derive(Subscriber)]
//! pub struct Screen;
//!
//! #[handlers(index)]
//! impl Screen {
//!     #[subscribe(mode = "main")]
//!     pub fn on_theme(&self, _theme: &ThemeChanged) {}
//! }
//!
//! fn main() -> RuntimeResult<()> {
//!     let runtime = HeraldRuntime::load()?;
//!     let handlers = runtime.register::<Screen>()?;
//!     assert_eq!(handlers[0].name(), "on_theme");
//!     Ok(())
//! }
//! ```
//!
//! The macros expand to paths under `::herald_core`, so crates using them
//! also depend on `herald-core` directly.
//!
//! ## Features
//!
//! - `toml-config`: Read `herald.toml` (default)
//! - `yaml-config`: Read `herald.yaml` / `herald.yml`
//! - `json-log`: Enable the `json` log format

pub use herald_core as core;
pub use herald_macros as macros;
pub use herald_runtime as runtime;

pub use herald_macros::{Subscriber, handlers};

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use herald::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use herald_runtime::{HeraldConfig, HeraldRuntime, RuntimeError, RuntimeResult};

    // Macros
    pub use herald_macros::{Subscriber, handlers};

    // Resolution
    pub use herald_core::{
        FinderError, HandlerMethod, SubscriberMethodFinder, ThreadMode, TypeKey, TypeRegistry,
    };

    // Core traits; `Subscriber` names both the trait and its derive
    pub use herald_core::{DeclaresHandlers, Subscriber, SubscriberIndex};
}
