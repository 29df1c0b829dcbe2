//! Handler object traits.
//!
//! # Parent-in-child hierarchies
//!
//! A derived subscriber embeds its parent as a field. The derive macro wires
//! the hierarchy so that the finder can walk it and so that a handler method
//! declared on the parent can be called through a derived instance:
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! #[derive(Subscriber)]
//! pub struct Screen;
//!
//! #[handlers]
//! impl Screen {
//!     #[subscribe(mode = "main")]
//!     pub fn on_theme(&self, theme: &ThemeChanged) { /* ... */ }
//! }
//!
//! #[derive(Subscriber)]
//! pub struct SettingsScreen {
//!     #[subscriber(parent)]
//!     screen: Screen,
//! }
//!
//! #[handlers]
//! impl SettingsScreen {
//!     #[subscribe(priority = 10, sticky)]
//!     pub fn on_account(&self, account: &AccountLoaded) { /* ... */ }
//! }
//! ```

use std::any::{Any, TypeId};

use super::descriptor::TypeDescriptor;
use super::method::MethodDescriptor;
use super::type_key::TypeKey;

/// A handler object whose type can be resolved into handler methods.
///
/// Use `#[derive(Subscriber)]` to implement it.
pub trait Subscriber: Any + Send + Sync {
    /// Returns the key of this type.
    ///
    /// `#[subscriber(name = "...")]` overrides the name reported here.
    fn type_key() -> TypeKey
    where
        Self: Sized,
    {
        TypeKey::of::<Self>()
    }

    /// Describes this type: its key, its parent and its declared methods.
    fn describe() -> TypeDescriptor
    where
        Self: Sized;

    /// Views `self` as the type `target`, walking up the parent chain.
    ///
    /// Returns `None` if `target` is neither this type nor an ancestor.
    fn upcast(&self, target: TypeId) -> Option<&dyn Any>;
}

/// The method table of a subscriber type.
///
/// Generated by `#[handlers]`. Types without handlers of their own can use
/// the empty default: `impl DeclaresHandlers for Base {}`.
pub trait DeclaresHandlers {
    /// Returns the methods declared directly on this type.
    fn declared_methods() -> Vec<MethodDescriptor>
    where
        Self: Sized,
    {
        Vec::new()
    }
}
