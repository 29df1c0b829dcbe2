//! Procedural macros for herald subscribers.
//!
//! This crate provides:
//!
//! - `#[derive(Subscriber)]` - Wires a struct into the subscriber hierarchy
//! - `#[handlers]` - Generates the method table of an impl block from its
//!   `#[subscribe(...)]` methods
//!
//! Generated code refers to `::herald_core`, so the crate using the macros
//! must depend on `herald-core` (or on the `herald` facade, which re-exports it).
//!
//! # Example
//!
//! ```rust,ignore
//! use herald::prelude::*;
//!
//! #[derive(Subscriber)]
//! pub struct Screen;
//!
//! #[handlers(index)]
//! impl Screen {
//!     #[subscribe(mode = "main")]
//!     pub fn on_theme(&self, theme: &ThemeChanged) {
//!         println!("theme changed to {}", theme.name);
//!     }
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
//!     pub fn on_account(&self, account: &AccountLoaded) {
//!         println!("signed in as {}", account.user);
//!     }
//! }
//! ```

mod handlers;
mod subscriber;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Derives `Subscriber` for a struct.
///
/// Generates:
/// - `type_key()` honouring `#[subscriber(name = "...")]`
/// - `describe()` linking the parent field and the `DeclaresHandlers` table
/// - `upcast()` that matches `Self` and then delegates to the parent
/// - `Deref` / `DerefMut` to the parent field, if there is one
///
/// # Attributes
///
/// - `#[subscriber(name = "...")]` - Override the fully-qualified type name
/// - `#[subscriber(parent)]` on a field - The embedded parent subscriber
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Subscriber)]
/// #[subscriber(name = "app::screens::Settings")]
/// pub struct SettingsScreen {
///     #[subscriber(parent)]
///     screen: Screen,
///     account: Option<String>,
/// }
/// ```
#[proc_macro_derive(Subscriber, attributes(subscriber))]
pub fn derive_subscriber(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match subscriber::derive_subscriber(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Generates `DeclaresHandlers` for an inherent impl block.
///
/// Every method carrying `#[subscribe(...)]` is recorded; other methods are
/// left alone. `#[handlers(index)]` additionally checks each marked method
/// at compile time and adds the type to the generated index, which requires
/// the type to implement `Subscriber`.
///
/// # Example
///
/// ```rust,ignore
/// #[handlers(index)]
/// impl SyncService {
///     #[subscribe(mode = "background", priority = -1)]
///     pub fn on_upload(&self, upload: &UploadQueued) {
///         self.queue.push(upload.id);
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn handlers(attr: TokenStream, item: TokenStream) -> TokenStream {
    handlers::handlers(attr, item)
}
