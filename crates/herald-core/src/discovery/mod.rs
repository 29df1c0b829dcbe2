//! Discovery layer - where handler metadata comes from.
//!
//! Two kinds of sources produce the same [`HandlerMethod`](crate::HandlerMethod) shape:
//! - **Introspective**: [`TypeIntrospector`], backed by the [`TypeRegistry`]
//!   of live type descriptors
//! - **Precompiled**: [`SubscriberIndex`] lookups, including the
//!   link-time [`GeneratedIndex`]
//!
//! The finder consults precompiled indexes first and falls back to
//! introspection.

pub mod generated;
pub mod index;
pub mod introspect;

pub use generated::{GENERATED_INDEX, GeneratedIndex, IndexEntry};
pub use index::{SimpleSubscriberIndex, SimpleSubscriberInfo, SubscriberIndex, SubscriberInfo};
pub use introspect::{TypeIntrospector, TypeRegistry};
