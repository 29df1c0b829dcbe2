//! Type identity for subscribers and messages.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifies a type by its [`TypeId`] and carries a fully-qualified name.
///
/// The name defaults to [`std::any::type_name`] and is only used for
/// diagnostics and for reserved-namespace checks during hierarchy walks.
/// Equality and hashing look at the `TypeId` alone.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// Returns the key of `T` under an explicit fully-qualified name.
    ///
    /// Useful for hand-built metadata that mirrors types living in another
    /// namespace.
    pub fn named<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
        }
    }

    /// Returns the underlying `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully-qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` if the type name starts with any of `prefixes`.
    pub fn in_namespace<S: AsRef<str>>(&self, prefixes: &[S]) -> bool {
        prefixes
            .iter()
            .any(|prefix| self.name.starts_with(prefix.as_ref()))
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeKey").field(&self.name).finish()
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Local;

    #[test]
    fn test_equality_ignores_name() {
        assert_eq!(TypeKey::of::<Local>(), TypeKey::named::<Local>("other::Local"));
        assert_ne!(TypeKey::of::<Local>(), TypeKey::of::<String>());
    }

    #[test]
    fn test_namespace_prefix() {
        let key = TypeKey::of::<String>();
        assert!(key.in_namespace(&["alloc::"]));
        assert!(!key.in_namespace(&["std::", "core::"]));
        assert!(!TypeKey::of::<Local>().in_namespace::<&str>(&[]));
    }
}
