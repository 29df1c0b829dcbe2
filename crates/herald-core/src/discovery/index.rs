//! Precompiled subscriber indexes.
//!
//! An index answers "which handler methods does this type declare" without
//! introspection. Index results are trusted as pre-validated: the finder
//! feeds them straight into override tracking.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::foundation::{
    HandlerMarker, HandlerMethod, Invoker, MethodDescriptor, MethodId, TypeKey,
};

/// Precompiled handler metadata of one subscriber type.
pub trait SubscriberInfo: Send + Sync {
    /// The type this metadata belongs to.
    fn subscriber_type(&self) -> TypeKey;

    /// Handler methods declared directly on the type.
    fn handler_methods(&self) -> &[HandlerMethod];

    /// Metadata of the parent type, when the index links it.
    fn super_subscriber_info(&self) -> Option<Arc<dyn SubscriberInfo>> {
        None
    }
}

/// A lookup table from subscriber type to its precompiled metadata.
pub trait SubscriberIndex: Send + Sync {
    /// Returns the metadata of `ty`, if the index covers it.
    fn subscriber_info(&self, ty: &TypeKey) -> Option<Arc<dyn SubscriberInfo>>;
}

// =============================================================================
// Simple Subscriber Info
// =============================================================================

/// Owned [`SubscriberInfo`] implementation.
///
/// # Example
///
/// ```rust,ignore
/// let info = SimpleSubscriberInfo::new(TypeKey::of::<Screen>())
///     .handler::<ThemeChanged>("on_theme", HandlerMarker::new(), invoke_on_theme);
/// ```
#[derive(Clone)]
pub struct SimpleSubscriberInfo {
    subscriber_type: TypeKey,
    super_info: Option<Arc<dyn SubscriberInfo>>,
    methods: Vec<HandlerMethod>,
}

impl SimpleSubscriberInfo {
    /// Creates metadata for `subscriber_type` with no methods.
    pub fn new(subscriber_type: TypeKey) -> Self {
        Self {
            subscriber_type,
            super_info: None,
            methods: Vec::new(),
        }
    }

    /// Builds metadata from a declared method table.
    ///
    /// Only marked single-parameter methods with an invoker are taken over;
    /// the table is expected to have been validated when it was generated.
    pub fn from_declared(subscriber_type: TypeKey, methods: Vec<MethodDescriptor>) -> Self {
        let methods = methods
            .into_iter()
            .filter_map(|method| {
                let marker = *method.get_marker()?;
                let invoker = method.get_invoker()?;
                let [message_type] = method.param_types() else {
                    return None;
                };
                Some(HandlerMethod::new(method.id(), *message_type, marker, invoker))
            })
            .collect();

        Self {
            subscriber_type,
            super_info: None,
            methods,
        }
    }

    /// Links the metadata of the parent type.
    pub fn with_super(mut self, info: Arc<dyn SubscriberInfo>) -> Self {
        self.super_info = Some(info);
        self
    }

    /// Adds a resolved handler method.
    pub fn method(mut self, method: HandlerMethod) -> Self {
        self.methods.push(method);
        self
    }

    /// Adds a handler declared on this type accepting `&M`.
    pub fn handler<M: 'static>(
        self,
        name: &'static str,
        marker: HandlerMarker,
        invoker: Invoker,
    ) -> Self {
        let id = MethodId::new(name, self.subscriber_type);
        self.method(HandlerMethod::new(id, TypeKey::of::<M>(), marker, invoker))
    }
}

impl SubscriberInfo for SimpleSubscriberInfo {
    fn subscriber_type(&self) -> TypeKey {
        self.subscriber_type
    }

    fn handler_methods(&self) -> &[HandlerMethod] {
        &self.methods
    }

    fn super_subscriber_info(&self) -> Option<Arc<dyn SubscriberInfo>> {
        self.super_info.clone()
    }
}

impl fmt::Debug for SimpleSubscriberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleSubscriberInfo")
            .field("subscriber_type", &self.subscriber_type)
            .field("methods", &self.methods)
            .field(
                "super_type",
                &self.super_info.as_ref().map(|info| info.subscriber_type()),
            )
            .finish()
    }
}

// =============================================================================
// Simple Subscriber Index
// =============================================================================

/// A `HashMap`-backed index assembled at startup.
#[derive(Default, Clone)]
pub struct SimpleSubscriberIndex {
    entries: HashMap<TypeId, Arc<dyn SubscriberInfo>>,
}

impl SimpleSubscriberIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds metadata to this index.
    pub fn insert(&mut self, info: Arc<dyn SubscriberInfo>) {
        self.entries.insert(info.subscriber_type().id(), info);
    }

    /// Adds metadata to this index (builder pattern).
    pub fn with(mut self, info: impl SubscriberInfo + 'static) -> Self {
        self.insert(Arc::new(info));
        self
    }

    /// Returns the number of covered types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the index covers no type.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SubscriberIndex for SimpleSubscriberIndex {
    fn subscriber_info(&self, ty: &TypeKey) -> Option<Arc<dyn SubscriberInfo>> {
        self.entries.get(&ty.id()).cloned()
    }
}

impl fmt::Debug for SimpleSubscriberIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleSubscriberIndex")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{MethodFlags, ThreadMode};

    struct Owner;
    struct Ping;
    struct Pong;

    fn noop(_: &dyn std::any::Any, _: &dyn std::any::Any) -> crate::error::InvokeResult {
        Ok(())
    }

    #[test]
    fn test_from_declared_keeps_only_handlers() {
        let owner = TypeKey::of::<Owner>();
        let info = SimpleSubscriberInfo::from_declared(
            owner,
            vec![
                MethodDescriptor::handler::<Owner, Ping>("on_ping", HandlerMarker::new(), noop),
                MethodDescriptor::new("helper", owner).param(TypeKey::of::<Pong>()),
                MethodDescriptor::new("no_args", owner)
                    .marker(HandlerMarker::new())
                    .invoker(noop),
                MethodDescriptor::handler::<Owner, Pong>(
                    "on_pong",
                    HandlerMarker::new().thread_mode(ThreadMode::Async),
                    noop,
                )
                .flags(MethodFlags::NONE),
            ],
        );

        let names: Vec<_> = info.handler_methods().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["on_ping", "on_pong"]);
        assert_eq!(info.handler_methods()[1].thread_mode(), ThreadMode::Async);
    }

    #[test]
    fn test_index_lookup() {
        let index = SimpleSubscriberIndex::new().with(
            SimpleSubscriberInfo::new(TypeKey::of::<Owner>()).handler::<Ping>(
                "on_ping",
                HandlerMarker::new().priority(3),
                noop,
            ),
        );

        let info = index.subscriber_info(&TypeKey::of::<Owner>());
        assert!(info.is_some_and(|info| info.handler_methods()[0].priority() == 3));
        assert!(index.subscriber_info(&TypeKey::of::<Ping>()).is_none());
    }
}
