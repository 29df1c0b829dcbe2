//! Live type metadata.
//!
//! A [`TypeDescriptor`] is the unit the [`TypeRegistry`](crate::discovery::TypeRegistry)
//! stores: the type key, a link to the parent type, and the method table.

use super::method::MethodDescriptor;
use super::subscriber::Subscriber;
use super::type_key::TypeKey;

/// Describes a type when only its key is known.
pub type DescribeFn = fn() -> TypeDescriptor;

/// The methods known for a type.
#[derive(Debug, Clone)]
pub enum MethodTable {
    /// Methods declared directly on the type.
    Declared(Vec<MethodDescriptor>),
    /// Per-type introspection is unavailable; these are all public methods
    /// visible on the type, inherited ones included.
    Flattened(Vec<MethodDescriptor>),
}

impl MethodTable {
    /// Returns the methods regardless of kind.
    pub fn methods(&self) -> &[MethodDescriptor] {
        match self {
            MethodTable::Declared(methods) | MethodTable::Flattened(methods) => methods,
        }
    }
}

impl Default for MethodTable {
    fn default() -> Self {
        MethodTable::Declared(Vec::new())
    }
}

/// Link from a type to its parent type.
#[derive(Debug, Clone, Copy)]
pub struct ParentLink {
    /// Key of the parent type.
    pub key: TypeKey,
    /// Describes the parent, when it can describe itself.
    pub describe: Option<DescribeFn>,
}

/// Metadata of one type.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    key: TypeKey,
    parent: Option<ParentLink>,
    methods: MethodTable,
}

impl TypeDescriptor {
    /// Starts a descriptor for `key`.
    pub fn builder(key: TypeKey) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            key,
            parent: None,
            methods: MethodTable::default(),
        }
    }

    /// Returns the key of the described type.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Returns the parent link, if the type has a parent.
    pub fn parent(&self) -> Option<&ParentLink> {
        self.parent.as_ref()
    }

    /// Returns the method table.
    pub fn methods(&self) -> &MethodTable {
        &self.methods
    }
}

/// Builder for [`TypeDescriptor`].
#[derive(Debug, Clone)]
pub struct TypeDescriptorBuilder {
    key: TypeKey,
    parent: Option<ParentLink>,
    methods: MethodTable,
}

impl TypeDescriptorBuilder {
    /// Sets a parent known only by key.
    pub fn parent(mut self, key: TypeKey) -> Self {
        self.parent = Some(ParentLink {
            key,
            describe: None,
        });
        self
    }

    /// Sets a parent that can describe itself.
    pub fn parent_with(mut self, key: TypeKey, describe: DescribeFn) -> Self {
        self.parent = Some(ParentLink {
            key,
            describe: Some(describe),
        });
        self
    }

    /// Sets `P` as the parent.
    pub fn parent_of<P: Subscriber>(self) -> Self {
        self.parent_with(P::type_key(), P::describe)
    }

    /// Sets the methods declared directly on the type.
    pub fn declared(mut self, methods: Vec<MethodDescriptor>) -> Self {
        self.methods = MethodTable::Declared(methods);
        self
    }

    /// Sets a flattened public method table (no per-type introspection).
    pub fn flattened(mut self, methods: Vec<MethodDescriptor>) -> Self {
        self.methods = MethodTable::Flattened(methods);
        self
    }

    /// Builds the descriptor.
    pub fn build(self) -> TypeDescriptor {
        TypeDescriptor {
            key: self.key,
            parent: self.parent,
            methods: self.methods,
        }
    }
}
