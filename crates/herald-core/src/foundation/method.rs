//! Method metadata as seen by runtime introspection.
//!
//! A [`MethodDescriptor`] records everything the finder needs to decide
//! whether a method is an eligible handler: its shape (visibility, flags,
//! parameters), the optional [`HandlerMarker`], and the [`Invoker`] used to
//! call it later.
//!
//! Descriptors are normally produced by `#[handlers]`, but they can be
//! assembled by hand for types whose metadata comes from elsewhere:
//!
//! ```rust,ignore
//! let method = MethodDescriptor::new("on_tick", TypeKey::of::<Clock>())
//!     .param(TypeKey::of::<Tick>())
//!     .marker(HandlerMarker::new().thread_mode(ThreadMode::Background))
//!     .invoker(|receiver, message| { /* downcast and call */ Ok(()) });
//! ```

use std::any::Any;
use std::fmt;
use std::ops::BitOr;

use super::thread_mode::ThreadMode;
use super::type_key::TypeKey;
use crate::error::{InvokeError, InvokeResult};

/// Calls a handler method.
///
/// The first argument is the subscriber already viewed as the declaring
/// type, the second is the posted message.
pub type Invoker = fn(&dyn Any, &dyn Any) -> InvokeResult;

/// Return types a handler method may have.
///
/// Generated invokers pass the handler's return value through this trait,
/// so an `Err` surfaces as [`InvokeError::HandlerFailed`].
pub trait HandlerOutput {
    fn into_invoke_result(self) -> InvokeResult;
}

impl HandlerOutput for () {
    fn into_invoke_result(self) -> InvokeResult {
        Ok(())
    }
}

impl<E: fmt::Display> HandlerOutput for Result<(), E> {
    fn into_invoke_result(self) -> InvokeResult {
        self.map_err(|error| InvokeError::HandlerFailed {
            reason: error.to_string(),
        })
    }
}

// ============================================================================
// Handler Marker
// ============================================================================

/// The declarative marker that turns a method into a handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HandlerMarker {
    /// Where the delivery engine runs the method.
    pub thread_mode: ThreadMode,
    /// Higher priorities are delivered first.
    pub priority: i32,
    /// Replay the latest sticky message of the type on subscribe.
    pub sticky: bool,
}

impl HandlerMarker {
    /// Creates a marker with default settings (posting thread, priority 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the thread mode.
    pub fn thread_mode(mut self, mode: ThreadMode) -> Self {
        self.thread_mode = mode;
        self
    }

    /// Sets the priority.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the sticky-replay flag.
    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }
}

// ============================================================================
// Visibility & Flags
// ============================================================================

/// Whether a method can be called from outside its declaring module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Publicly callable.
    #[default]
    Public,
    /// Private or crate-restricted.
    Restricted,
}

/// Modifier bits that disqualify a method from being a handler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MethodFlags(u8);

impl MethodFlags {
    /// No modifiers.
    pub const NONE: Self = Self(0);
    /// Declared without a body.
    pub const ABSTRACT: Self = Self(0x01);
    /// Associated function without a receiver.
    pub const STATIC: Self = Self(0x02);
    /// Compiler-generated ABI bridge.
    pub const BRIDGE: Self = Self(0x04);
    /// Compiler-synthesized method.
    pub const SYNTHETIC: Self = Self(0x08);

    /// Every modifier that makes a marked method ineligible.
    pub const IGNORED: Self =
        Self(Self::ABSTRACT.0 | Self::STATIC.0 | Self::BRIDGE.0 | Self::SYNTHETIC.0);

    /// Returns `true` if all bits of `other` are set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if any bit of `other` is set.
    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for MethodFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ============================================================================
// Method Identity
// ============================================================================

/// Identity of a method: its name and the type declaring it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId {
    /// Method name.
    pub name: &'static str,
    /// Declaring type.
    pub declaring: TypeKey,
}

impl MethodId {
    /// Creates a method identity.
    pub fn new(name: &'static str, declaring: TypeKey) -> Self {
        Self { name, declaring }
    }
}

// ============================================================================
// Method Descriptor
// ============================================================================

/// Introspected view of one method.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    id: MethodId,
    params: Vec<TypeKey>,
    visibility: Visibility,
    flags: MethodFlags,
    marker: Option<HandlerMarker>,
    invoker: Option<Invoker>,
}

impl MethodDescriptor {
    /// Creates a public, parameterless, unmarked method.
    pub fn new(name: &'static str, declaring: TypeKey) -> Self {
        Self {
            id: MethodId::new(name, declaring),
            params: Vec::new(),
            visibility: Visibility::Public,
            flags: MethodFlags::NONE,
            marker: None,
            invoker: None,
        }
    }

    /// Creates a public handler on `S` accepting `&M`.
    pub fn handler<S: 'static, M: 'static>(
        name: &'static str,
        marker: HandlerMarker,
        invoker: Invoker,
    ) -> Self {
        Self::new(name, TypeKey::of::<S>())
            .param(TypeKey::of::<M>())
            .marker(marker)
            .invoker(invoker)
    }

    /// Appends a parameter type.
    pub fn param(mut self, ty: TypeKey) -> Self {
        self.params.push(ty);
        self
    }

    /// Replaces the parameter list.
    pub fn params(mut self, params: impl IntoIterator<Item = TypeKey>) -> Self {
        self.params = params.into_iter().collect();
        self
    }

    /// Sets the visibility.
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Sets the modifier flags.
    pub fn flags(mut self, flags: MethodFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Attaches the handler marker.
    pub fn marker(mut self, marker: HandlerMarker) -> Self {
        self.marker = Some(marker);
        self
    }

    /// Attaches the invoker.
    pub fn invoker(mut self, invoker: Invoker) -> Self {
        self.invoker = Some(invoker);
        self
    }

    /// Returns the method identity.
    pub fn id(&self) -> MethodId {
        self.id
    }

    /// Returns the method name.
    pub fn name(&self) -> &'static str {
        self.id.name
    }

    /// Returns the declaring type.
    pub fn declaring(&self) -> TypeKey {
        self.id.declaring
    }

    /// Returns the parameter types, receiver excluded.
    pub fn param_types(&self) -> &[TypeKey] {
        &self.params
    }

    /// Returns the visibility.
    pub fn get_visibility(&self) -> Visibility {
        self.visibility
    }

    /// Returns the modifier flags.
    pub fn get_flags(&self) -> MethodFlags {
        self.flags
    }

    /// Returns the handler marker, if any.
    pub fn get_marker(&self) -> Option<&HandlerMarker> {
        self.marker.as_ref()
    }

    /// Returns the invoker, if any.
    pub fn get_invoker(&self) -> Option<Invoker> {
        self.invoker
    }

    /// Whether the method is public and carries none of the ignored modifiers.
    pub fn is_callable(&self) -> bool {
        self.visibility == Visibility::Public && !self.flags.intersects(MethodFlags::IGNORED)
    }
}
