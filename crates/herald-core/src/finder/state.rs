//! Per-pass working state of the finder.
//!
//! A [`FindState`] lives for one resolution pass: it tracks where the
//! hierarchy walk currently is, collects the accepted handler methods, and
//! deduplicates methods overridden in a more-derived type.

use std::any::TypeId;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use tracing::trace;

use crate::discovery::{SubscriberInfo, TypeIntrospector};
use crate::error::{FinderError, FinderResult};
use crate::foundation::{HandlerMethod, MethodId, TypeKey};

/// First-level claim on a message type.
#[derive(Debug, Clone, Copy)]
enum FirstClaim {
    /// The only method seen so far for the message type.
    Method(MethodId),
    /// More than one method was seen; signature keys are authoritative.
    Consumed,
}

/// Exact-signature key: method name and message type.
type MethodKey = (&'static str, TypeId);

#[derive(Default)]
pub(crate) struct FindState {
    pub(crate) subscriber_methods: Vec<HandlerMethod>,
    any_method_by_message_type: HashMap<TypeId, FirstClaim>,
    subscriber_type_by_method_key: HashMap<MethodKey, TypeKey>,
    /// (declaring type, message type) -> first method name, introspected methods only.
    handled_by_declaring_type: HashMap<(TypeId, TypeId), &'static str>,
    pub(crate) subscriber_type: Option<TypeKey>,
    pub(crate) current: Option<TypeKey>,
    pub(crate) skip_super_types: bool,
    pub(crate) subscriber_info: Option<Arc<dyn SubscriberInfo>>,
}

impl FindState {
    pub(crate) fn init_for_subscriber(&mut self, subscriber: TypeKey) {
        self.subscriber_type = Some(subscriber);
        self.current = Some(subscriber);
        self.skip_super_types = false;
        self.subscriber_info = None;
    }

    /// Drops every reference held by this state, keeping allocations.
    pub(crate) fn recycle(&mut self) {
        self.subscriber_methods.clear();
        self.any_method_by_message_type.clear();
        self.subscriber_type_by_method_key.clear();
        self.handled_by_declaring_type.clear();
        self.subscriber_type = None;
        self.current = None;
        self.skip_super_types = false;
        self.subscriber_info = None;
    }

    #[cfg(test)]
    pub(crate) fn is_clear(&self) -> bool {
        self.subscriber_methods.is_empty()
            && self.any_method_by_message_type.is_empty()
            && self.subscriber_type_by_method_key.is_empty()
            && self.handled_by_declaring_type.is_empty()
            && self.subscriber_type.is_none()
            && self.current.is_none()
            && !self.skip_super_types
            && self.subscriber_info.is_none()
    }

    /// Decides whether `method` should be kept.
    ///
    /// Two-level check: the first level looks at the message type only, the
    /// second at the complete signature, and only runs once a message type
    /// has more than one candidate.
    pub(crate) fn check_add(
        &mut self,
        method: MethodId,
        message_type: TypeKey,
        types: &dyn TypeIntrospector,
    ) -> FinderResult<bool> {
        let existing = self
            .any_method_by_message_type
            .insert(message_type.id(), FirstClaim::Method(method));

        match existing {
            None => Ok(true),
            Some(FirstClaim::Method(existing)) => {
                if !self.check_add_with_method_signature(existing, message_type, types) {
                    return Err(FinderError::AmbiguousOverrideState {
                        declaring: existing.declaring.name(),
                        method: existing.name,
                        message_type: message_type.name(),
                    });
                }
                self.any_method_by_message_type
                    .insert(message_type.id(), FirstClaim::Consumed);
                Ok(self.check_add_with_method_signature(method, message_type, types))
            }
            Some(FirstClaim::Consumed) => {
                self.any_method_by_message_type
                    .insert(message_type.id(), FirstClaim::Consumed);
                Ok(self.check_add_with_method_signature(method, message_type, types))
            }
        }
    }

    fn check_add_with_method_signature(
        &mut self,
        method: MethodId,
        message_type: TypeKey,
        types: &dyn TypeIntrospector,
    ) -> bool {
        let key = (method.name, message_type.id());
        match self.subscriber_type_by_method_key.insert(key, method.declaring) {
            None => true,
            Some(old) if types.is_ancestor_or_self(&old, &method.declaring) => true,
            Some(old) => {
                // The claim belongs to a more-derived override; put it back.
                self.subscriber_type_by_method_key.insert(key, old);
                trace!(
                    method = method.name,
                    declaring = %method.declaring,
                    overridden_in = %old,
                    "Skipping overridden handler method"
                );
                false
            }
        }
    }

    /// Records that `method` handles `message_type` on its declaring type.
    ///
    /// Returns the name of the method that already did, if any.
    pub(crate) fn check_declared_once(
        &mut self,
        method: MethodId,
        message_type: TypeKey,
    ) -> Option<&'static str> {
        match self
            .handled_by_declaring_type
            .entry((method.declaring.id(), message_type.id()))
        {
            Entry::Occupied(first) => Some(*first.get()),
            Entry::Vacant(slot) => {
                slot.insert(method.name);
                None
            }
        }
    }

    pub(crate) fn move_to_super_type<S: AsRef<str>>(
        &mut self,
        types: &dyn TypeIntrospector,
        reserved_prefixes: &[S],
    ) {
        if self.skip_super_types {
            self.current = None;
            return;
        }

        self.current = self
            .current
            .and_then(|ty| types.parent_of(&ty))
            .filter(|parent| {
                let reserved = parent.in_namespace(reserved_prefixes);
                if reserved {
                    trace!(ty = %parent, "Stopping at reserved namespace");
                }
                !reserved
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::TypeRegistry;
    use crate::foundation::TypeDescriptor;

    struct Base;
    struct Derived;
    struct Event;
    struct Other;

    fn registry() -> TypeRegistry {
        let registry = TypeRegistry::new();
        registry
            .register_descriptor(TypeDescriptor::builder(TypeKey::of::<Base>()).build())
            .unwrap();
        registry
            .register_descriptor(
                TypeDescriptor::builder(TypeKey::of::<Derived>())
                    .parent(TypeKey::of::<Base>())
                    .build(),
            )
            .unwrap();
        registry
    }

    fn method<T: 'static>(name: &'static str) -> MethodId {
        MethodId::new(name, TypeKey::of::<T>())
    }

    #[test]
    fn test_fast_path_never_builds_signature_keys() {
        let types = registry();
        let mut state = FindState::default();

        let event = TypeKey::of::<Event>();
        let other = TypeKey::of::<Other>();
        assert_eq!(state.check_add(method::<Derived>("on_event"), event, &types), Ok(true));
        assert_eq!(state.check_add(method::<Derived>("on_other"), other, &types), Ok(true));
        assert!(state.subscriber_type_by_method_key.is_empty());
    }

    #[test]
    fn test_override_in_derived_type_wins() {
        let types = registry();
        let mut state = FindState::default();
        let event = TypeKey::of::<Event>();

        assert_eq!(state.check_add(method::<Derived>("on_event"), event, &types), Ok(true));
        assert_eq!(state.check_add(method::<Base>("on_event"), event, &types), Ok(false));
        // The rejected ancestor did not steal the claim.
        assert_eq!(
            state.subscriber_type_by_method_key[&("on_event", event.id())],
            TypeKey::of::<Derived>()
        );
    }

    #[test]
    fn test_different_names_for_same_message_are_both_kept() {
        let types = registry();
        let mut state = FindState::default();
        let event = TypeKey::of::<Event>();

        assert_eq!(state.check_add(method::<Derived>("on_event"), event, &types), Ok(true));
        assert_eq!(state.check_add(method::<Base>("on_base_event"), event, &types), Ok(true));
        assert_eq!(state.check_add(method::<Base>("on_event"), event, &types), Ok(false));
    }

    #[test]
    fn test_inconsistent_claim_is_reported() {
        let types = registry();
        let mut state = FindState::default();
        let event = TypeKey::of::<Event>();

        assert_eq!(state.check_add(method::<Base>("on_event"), event, &types), Ok(true));
        // A derived claim on the same signature that bypassed the first level.
        state
            .subscriber_type_by_method_key
            .insert(("on_event", event.id()), TypeKey::of::<Derived>());

        let result = state.check_add(method::<Base>("on_again"), event, &types);
        assert!(matches!(
            result,
            Err(FinderError::AmbiguousOverrideState { method: "on_event", .. })
        ));
    }

    #[test]
    fn test_declared_once_is_scoped_to_declaring_type() {
        let mut state = FindState::default();
        let event = TypeKey::of::<Event>();

        assert_eq!(state.check_declared_once(method::<Derived>("first"), event), None);
        assert_eq!(state.check_declared_once(method::<Base>("first"), event), None);
        assert_eq!(
            state.check_declared_once(method::<Derived>("second"), event),
            Some("first")
        );
    }

    #[test]
    fn test_walk_stops_at_reserved_namespace_and_on_skip() {
        let types = registry();
        let mut state = FindState::default();

        state.init_for_subscriber(TypeKey::of::<Derived>());
        state.move_to_super_type(&types, &["herald_core::"]);
        assert_eq!(state.current, None);

        state.init_for_subscriber(TypeKey::of::<Derived>());
        state.move_to_super_type::<&str>(&types, &[]);
        assert_eq!(state.current, Some(TypeKey::of::<Base>()));
        state.move_to_super_type::<&str>(&types, &[]);
        assert_eq!(state.current, None);

        state.init_for_subscriber(TypeKey::of::<Derived>());
        state.skip_super_types = true;
        state.move_to_super_type::<&str>(&types, &[]);
        assert_eq!(state.current, None);
    }

    #[test]
    fn test_recycle_clears_everything() {
        let types = registry();
        let mut state = FindState::default();
        let event = TypeKey::of::<Event>();

        state.init_for_subscriber(TypeKey::of::<Derived>());
        state.skip_super_types = true;
        let _ = state.check_add(method::<Derived>("a"), event, &types);
        let _ = state.check_add(method::<Derived>("b"), event, &types);
        state.check_declared_once(method::<Derived>("a"), event);
        assert!(!state.is_clear());

        state.recycle();
        assert!(state.is_clear());
    }
}
