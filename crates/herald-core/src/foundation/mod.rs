//! Foundation layer - type identity and handler metadata.
//!
//! This module contains the data the resolution engine works on:
//! - Type keys for subscribers and messages
//! - Method descriptors as seen by introspection
//! - Resolved handler methods and their dispatch modes
//! - The subscriber traits implemented by handler objects

pub mod descriptor;
pub mod handler;
pub mod method;
pub mod subscriber;
pub mod thread_mode;
pub mod type_key;

pub use descriptor::{DescribeFn, MethodTable, ParentLink, TypeDescriptor, TypeDescriptorBuilder};
pub use handler::HandlerMethod;
pub use method::{
    HandlerMarker, HandlerOutput, Invoker, MethodDescriptor, MethodFlags, MethodId, Visibility,
};
pub use subscriber::{DeclaresHandlers, Subscriber};
pub use thread_mode::{ParseThreadModeError, ThreadMode};
pub use type_key::TypeKey;
