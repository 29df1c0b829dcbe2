//! Process-wide resolution cache.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::foundation::{HandlerMethod, TypeKey};

/// Map from subscriber type to its resolved handler methods.
///
/// Entries are never evicted, only purged all at once by [`clear`](Self::clear).
/// Two threads missing on the same type may both compute it; whichever
/// insert lands last wins, and both results are equal.
#[derive(Default)]
pub(crate) struct MethodCache {
    entries: RwLock<HashMap<TypeId, Arc<[HandlerMethod]>>>,
}

impl MethodCache {
    pub(crate) fn get(&self, subscriber: &TypeKey) -> Option<Arc<[HandlerMethod]>> {
        self.entries.read().get(&subscriber.id()).cloned()
    }

    pub(crate) fn insert(&self, subscriber: &TypeKey, methods: Arc<[HandlerMethod]>) {
        self.entries.write().insert(subscriber.id(), methods);
    }

    pub(crate) fn clear(&self) {
        self.entries.write().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}
