//! Introspective discovery over live type metadata.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{trace, warn};

use crate::error::{CyclicHierarchy, IntrospectionUnsupported};
use crate::foundation::{
    DescribeFn, MethodDescriptor, MethodTable, Subscriber, TypeDescriptor, TypeKey, Visibility,
};

/// Source of type metadata for the hierarchy walk and per-type resolution.
///
/// Types the introspector knows nothing about have no parent and no methods.
pub trait TypeIntrospector: Send + Sync {
    /// Returns the direct parent of `ty`.
    fn parent_of(&self, ty: &TypeKey) -> Option<TypeKey>;

    /// Returns the methods declared directly on `ty`.
    ///
    /// Fails with [`IntrospectionUnsupported`] when only the flattened public
    /// method set is available; callers then use [`public_methods`](Self::public_methods)
    /// and must not scan the ancestors again.
    fn declared_methods(
        &self,
        ty: &TypeKey,
    ) -> Result<Vec<MethodDescriptor>, IntrospectionUnsupported>;

    /// Returns every public method visible on `ty`, inherited ones included.
    fn public_methods(&self, ty: &TypeKey) -> Vec<MethodDescriptor>;

    /// Returns `true` if `ancestor` is `descendant` or one of its ancestors.
    fn is_ancestor_or_self(&self, ancestor: &TypeKey, descendant: &TypeKey) -> bool {
        let mut current = Some(*descendant);
        while let Some(ty) = current {
            if ty == *ancestor {
                return true;
            }
            current = self.parent_of(&ty);
        }
        false
    }
}

// =============================================================================
// Type Registry
// =============================================================================

/// Registry of type descriptors, the standard [`TypeIntrospector`].
///
/// Parent chains stay acyclic: a descriptor that would make its type its
/// own ancestor is rejected, and a described ancestor that would close a
/// cycle is not recorded.
///
/// # Thread Safety
///
/// `TypeRegistry` is `Send + Sync`; lookups only take a shared lock.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<HashMap<TypeId, Arc<TypeDescriptor>>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `T` and every ancestor it can describe.
    ///
    /// Stops at the first type that is already known, so repeated
    /// registration is cheap.
    pub fn register<T: Subscriber>(&self) {
        self.register_chain(T::type_key(), Some(T::describe));
    }

    /// Records a hand-built descriptor, replacing any previous one.
    ///
    /// Ancestors that can describe themselves are recorded as well.
    ///
    /// # Errors
    ///
    /// [`CyclicHierarchy`] if the descriptor's type is already among the
    /// ancestors of its declared parent. Nothing is recorded in that case.
    pub fn register_descriptor(&self, descriptor: TypeDescriptor) -> Result<(), CyclicHierarchy> {
        let key = descriptor.key();
        let parent = descriptor.parent().map(|link| (link.key, link.describe));

        if let Some((parent_key, _)) = parent
            && self.is_ancestor_or_self(&key, &parent_key)
        {
            return Err(CyclicHierarchy { ty: key.name() });
        }

        trace!(ty = %key, "Registering type descriptor");
        self.types.write().insert(key.id(), Arc::new(descriptor));

        if let Some((key, describe)) = parent {
            self.register_chain(key, describe);
        }
        Ok(())
    }

    fn register_chain(&self, key: TypeKey, describe: Option<DescribeFn>) {
        let mut next = Some((key, describe));

        while let Some((key, describe)) = next {
            if self.contains(&key) {
                break;
            }
            let Some(describe) = describe else {
                break;
            };

            let descriptor = describe();
            next = descriptor.parent().map(|link| (link.key, link.describe));

            if let Some((parent, _)) = next
                && self.is_ancestor_or_self(&descriptor.key(), &parent)
            {
                warn!(ty = %descriptor.key(), "Not registering type that would be its own ancestor");
                break;
            }

            trace!(ty = %descriptor.key(), "Registering type descriptor");
            self.types
                .write()
                .insert(descriptor.key().id(), Arc::new(descriptor));
        }
    }

    /// Returns the descriptor of `ty`.
    pub fn get(&self, ty: &TypeKey) -> Option<Arc<TypeDescriptor>> {
        self.types.read().get(&ty.id()).cloned()
    }

    /// Returns `true` if `ty` has been registered.
    pub fn contains(&self, ty: &TypeKey) -> bool {
        self.types.read().contains_key(&ty.id())
    }

    /// Returns the number of registered types.
    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    /// Returns `true` if no type has been registered.
    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }
}

impl TypeIntrospector for TypeRegistry {
    fn parent_of(&self, ty: &TypeKey) -> Option<TypeKey> {
        self.get(ty)
            .and_then(|descriptor| descriptor.parent().map(|link| link.key))
    }

    fn declared_methods(
        &self,
        ty: &TypeKey,
    ) -> Result<Vec<MethodDescriptor>, IntrospectionUnsupported> {
        match self.get(ty) {
            Some(descriptor) => match descriptor.methods() {
                MethodTable::Declared(methods) => Ok(methods.clone()),
                MethodTable::Flattened(_) => Err(IntrospectionUnsupported),
            },
            None => Ok(Vec::new()),
        }
    }

    /// Methods overridden by a more-derived type in the result are left out,
    /// whatever order the table lists them in.
    fn public_methods(&self, ty: &TypeKey) -> Vec<MethodDescriptor> {
        let mut methods = Vec::new();
        let mut current = self.get(ty);

        while let Some(descriptor) = current {
            let flattened = matches!(descriptor.methods(), MethodTable::Flattened(_));
            methods.extend(
                descriptor
                    .methods()
                    .methods()
                    .iter()
                    .filter(|method| method.get_visibility() == Visibility::Public)
                    .cloned(),
            );
            if flattened {
                // Already includes everything inherited.
                break;
            }
            current = descriptor.parent().and_then(|link| self.get(&link.key));
        }

        let overridden = |method: &MethodDescriptor| {
            methods.iter().any(|other| {
                other.declaring() != method.declaring()
                    && other.name() == method.name()
                    && other.param_types() == method.param_types()
                    && self.is_ancestor_or_self(&method.declaring(), &other.declaring())
            })
        };
        methods
            .iter()
            .filter(|method| !overridden(method))
            .cloned()
            .collect()
    }
}
