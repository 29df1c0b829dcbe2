//! Build-time generated subscriber index.
//!
//! `#[handlers(index)]` contributes one [`IndexEntry`] per subscriber type to
//! the [`GENERATED_INDEX`] distributed slice at link time. [`GeneratedIndex`]
//! materializes the slice into a lookup table on first use.

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use linkme::distributed_slice;
use tracing::debug;

use super::index::{SimpleSubscriberInfo, SubscriberIndex, SubscriberInfo};
use crate::foundation::TypeKey;

/// One generated index entry.
///
/// Holds a function rather than data because `TypeId` is not available in
/// const context.
#[derive(Clone, Copy)]
pub struct IndexEntry {
    info: fn() -> SimpleSubscriberInfo,
}

impl IndexEntry {
    /// Creates an entry from the function that builds its metadata.
    pub const fn new(info: fn() -> SimpleSubscriberInfo) -> Self {
        Self { info }
    }

    /// Builds the metadata of this entry.
    pub fn info(&self) -> SimpleSubscriberInfo {
        (self.info)()
    }
}

/// Registry of generated index entries.
/// Each type annotated with `#[handlers(index)]` contributes one entry.
#[distributed_slice]
pub static GENERATED_INDEX: [IndexEntry];

/// [`SubscriberIndex`] over [`GENERATED_INDEX`].
#[derive(Default)]
pub struct GeneratedIndex {
    entries: OnceLock<HashMap<TypeId, Arc<dyn SubscriberInfo>>>,
}

impl GeneratedIndex {
    /// Creates an index; the slice is read lazily.
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> &HashMap<TypeId, Arc<dyn SubscriberInfo>> {
        self.entries.get_or_init(|| {
            let entries: HashMap<_, _> = GENERATED_INDEX
                .iter()
                .map(|entry| {
                    let info = entry.info();
                    (
                        info.subscriber_type().id(),
                        Arc::new(info) as Arc<dyn SubscriberInfo>,
                    )
                })
                .collect();
            debug!(count = entries.len(), "Loaded generated subscriber index");
            entries
        })
    }

    /// Returns the number of types in the generated index.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Returns `true` if no type was generated into the index.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl SubscriberIndex for GeneratedIndex {
    fn subscriber_info(&self, ty: &TypeKey) -> Option<Arc<dyn SubscriberInfo>> {
        self.entries().get(&ty.id()).cloned()
    }
}

impl fmt::Debug for GeneratedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedIndex")
            .field("loaded", &self.entries.get().map(HashMap::len))
            .finish()
    }
}
