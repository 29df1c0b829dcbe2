//! Unified error types for the herald core.
//!
//! Resolution failures are configuration bugs, not transient conditions:
//! resolution is deterministic, so nothing here is ever retried.

use thiserror::Error;

// =============================================================================
// Finder Errors
// =============================================================================

/// Errors raised while resolving the handler methods of a subscriber type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FinderError {
    /// The type and its scanned ancestors declare no usable handler method.
    #[error(
        "subscriber {subscriber} and its ancestor types have no public methods marked as handlers"
    )]
    NoEligibleHandlers {
        /// Fully-qualified name of the subscriber type.
        subscriber: &'static str,
    },

    /// A marked method has the wrong shape (strict verification only).
    #[error("illegal handler method {declaring}::{method}: {reason}")]
    InvalidHandlerSignature {
        /// Type declaring the method.
        declaring: &'static str,
        /// Method name.
        method: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Two handler methods on one type accept the same message type
    /// (strict verification only).
    #[error(
        "{declaring} declares both `{first}` and `{second}` as handlers for message type {message_type}"
    )]
    DuplicateHandler {
        /// Type declaring both methods.
        declaring: &'static str,
        /// Message type both methods accept.
        message_type: &'static str,
        /// The method that was kept.
        first: &'static str,
        /// The method that collided with it.
        second: &'static str,
    },

    /// The override tracker reached a state that should be impossible.
    #[error(
        "inconsistent override state for {declaring}::{method} handling {message_type}"
    )]
    AmbiguousOverrideState {
        /// Type declaring the method being checked.
        declaring: &'static str,
        /// Method name.
        method: &'static str,
        /// Message type of the method.
        message_type: &'static str,
    },
}

impl FinderError {
    /// Creates an invalid signature error for a method.
    pub fn invalid_signature(
        declaring: &'static str,
        method: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidHandlerSignature {
            declaring,
            method,
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Invoke Errors
// =============================================================================

/// Errors that can occur when calling a resolved handler method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    /// The subscriber instance cannot be viewed as the declaring type.
    #[error("subscriber is not an instance of {expected}")]
    ReceiverMismatch {
        /// Declaring type the method needs.
        expected: &'static str,
    },

    /// The message is not of the type the method accepts.
    #[error("message is not of type {expected}")]
    MessageMismatch {
        /// Message type the method accepts.
        expected: &'static str,
    },

    /// The handler ran and returned an error.
    #[error("handler failed: {reason}")]
    HandlerFailed {
        /// Rendered error returned by the handler.
        reason: String,
    },
}

/// A hand-built descriptor would make its type its own ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("registering {ty} would make it its own ancestor")]
pub struct CyclicHierarchy {
    /// Fully-qualified name of the rejected type.
    pub ty: &'static str,
}

/// Per-type introspection is not available for a type.
///
/// Returned by [`TypeIntrospector::declared_methods`](crate::discovery::TypeIntrospector::declared_methods)
/// to request the flattened fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("declared-method introspection is not available for this type")]
pub struct IntrospectionUnsupported;

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for resolution operations.
pub type FinderResult<T> = Result<T, FinderError>;

/// Result type for handler invocation.
pub type InvokeResult = Result<(), InvokeError>;
