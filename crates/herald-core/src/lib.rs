//! # Herald Core
//!
//! The subscriber resolution engine of the herald message bus.
//!
//! Given the type of a handler object, this crate determines which of its
//! methods receive posted messages, which message type each accepts, and how
//! each is dispatched. Results are cached per type for the lifetime of the
//! finder.
//!
//! ## Architecture Layers
//!
//! ### Foundation Layer
//!
//! Type identity and handler metadata:
//! - **Type Keys**: Identity plus fully-qualified name ([`TypeKey`])
//! - **Method Metadata**: Introspected methods ([`MethodDescriptor`]) and
//!   resolved handlers ([`HandlerMethod`], [`ThreadMode`])
//! - **Subscriber Traits**: Handler objects and their hierarchies
//!   ([`Subscriber`], [`DeclaresHandlers`])
//!
//! ### Discovery Layer
//!
//! Where handler metadata comes from:
//! - **Introspection**: Live type descriptors ([`TypeIntrospector`], [`TypeRegistry`])
//! - **Precompiled Indexes**: Lookup tables built ahead of time
//!   ([`SubscriberIndex`], [`GeneratedIndex`])
//!
//! ### Finder Layer
//!
//! The resolution engine itself ([`SubscriberMethodFinder`]): hierarchy walk,
//! override deduplication, validation and caching.
//!
//! ## Resolution Flow
//!
//! ```text
//! ┌──────────────┐  miss  ┌───────────────┐  none  ┌───────────────┐
//! │ Method Cache │───────▶│ Index Lookup  │───────▶│ Introspection │
//! └──────────────┘        └───────────────┘        └───────────────┘
//!        ▲                        │                        │
//!        │                        ▼                        ▼
//!        └────────────────── override check ◀──────────────┘
//!                          (then next ancestor)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use herald_core::{SubscriberMethodFinder, TypeKey, TypeRegistry};
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry.register::<SettingsScreen>();
//!
//! let finder = SubscriberMethodFinder::new(registry);
//! for method in finder.find_subscriber_methods(TypeKey::of::<SettingsScreen>())?.iter() {
//!     println!("{} handles {}", method.name(), method.message_type());
//! }
//! ```

// Architectural layers
pub mod discovery;
pub mod error;
pub mod finder;
pub mod foundation;

// Re-export linkme for the generated index
pub use linkme;

// Re-export foundation types
pub use foundation::{
    DeclaresHandlers, DescribeFn, HandlerMarker, HandlerMethod, HandlerOutput, Invoker, MethodDescriptor,
    MethodFlags, MethodId, MethodTable, ParentLink, ParseThreadModeError, Subscriber, ThreadMode,
    TypeDescriptor, TypeDescriptorBuilder, TypeKey, Visibility,
};

// Re-export discovery types
pub use discovery::{
    GENERATED_INDEX, GeneratedIndex, IndexEntry, SimpleSubscriberIndex, SimpleSubscriberInfo,
    SubscriberIndex, SubscriberInfo, TypeIntrospector, TypeRegistry,
};

// Re-export finder types
pub use finder::{
    DEFAULT_POOL_SIZE, DEFAULT_RESERVED_PREFIXES, FinderBuilder, FinderOptions,
    SubscriberMethodFinder,
};

// Re-export errors
pub use error::{
    CyclicHierarchy, FinderError, FinderResult, IntrospectionUnsupported, InvokeError,
    InvokeResult,
};

/// Prelude for common imports.
pub mod prelude {
    pub use super::discovery::{SubscriberIndex, TypeIntrospector, TypeRegistry};
    pub use super::error::{FinderError, FinderResult, InvokeError};
    pub use super::finder::{FinderOptions, SubscriberMethodFinder};
    pub use super::foundation::*;
}
