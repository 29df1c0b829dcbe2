//! Resolved handler methods.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::method::{HandlerMarker, Invoker, MethodId};
use super::subscriber::Subscriber;
use super::thread_mode::ThreadMode;
use super::type_key::TypeKey;
use crate::error::{InvokeError, InvokeResult};

/// A method that receives posted messages of one specific type.
///
/// This is what the delivery engine consumes: the dispatch metadata plus
/// enough identity to call the method on a concrete subscriber instance.
/// Immutable once constructed.
#[derive(Clone)]
pub struct HandlerMethod {
    method: MethodId,
    message_type: TypeKey,
    thread_mode: ThreadMode,
    priority: i32,
    sticky: bool,
    invoker: Invoker,
}

impl HandlerMethod {
    /// Creates a handler method.
    pub fn new(
        method: MethodId,
        message_type: TypeKey,
        marker: HandlerMarker,
        invoker: Invoker,
    ) -> Self {
        Self {
            method,
            message_type,
            thread_mode: marker.thread_mode,
            priority: marker.priority,
            sticky: marker.sticky,
            invoker,
        }
    }

    /// Returns the method identity.
    pub fn method(&self) -> MethodId {
        self.method
    }

    /// Returns the method name.
    pub fn name(&self) -> &'static str {
        self.method.name
    }

    /// Returns the type declaring the method.
    pub fn declaring_type(&self) -> TypeKey {
        self.method.declaring
    }

    /// Returns the exact message type the method accepts.
    pub fn message_type(&self) -> TypeKey {
        self.message_type
    }

    /// Returns the dispatch mode.
    pub fn thread_mode(&self) -> ThreadMode {
        self.thread_mode
    }

    /// Returns the delivery priority; higher is delivered first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Returns whether the latest sticky message is replayed on subscribe.
    pub fn is_sticky(&self) -> bool {
        self.sticky
    }

    /// Calls the method on `subscriber` with `message`.
    ///
    /// The subscriber is first viewed as the declaring type, so a method
    /// inherited from an ancestor is called on the embedded ancestor value.
    pub fn invoke(&self, subscriber: &dyn Subscriber, message: &dyn Any) -> InvokeResult {
        let receiver = subscriber.upcast(self.method.declaring.id()).ok_or(
            InvokeError::ReceiverMismatch {
                expected: self.method.declaring.name(),
            },
        )?;
        (self.invoker)(receiver, message)
    }
}

impl PartialEq for HandlerMethod {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method && self.message_type == other.message_type
    }
}

impl Eq for HandlerMethod {}

impl Hash for HandlerMethod {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.method.hash(state);
        self.message_type.hash(state);
    }
}

impl fmt::Debug for HandlerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerMethod")
            .field("method", &format_args!("{}::{}", self.method.declaring, self.method.name))
            .field("message_type", &self.message_type)
            .field("thread_mode", &self.thread_mode)
            .field("priority", &self.priority)
            .field("sticky", &self.sticky)
            .finish()
    }
}
