//! Subscriber resolution - from a subscriber type to its handler methods.
//!
//! [`SubscriberMethodFinder`] is the entry point. Resolving a type:
//!
//! 1. Returns the cached list on a hit
//! 2. Otherwise borrows a scratch state from the pool and walks the type
//!    hierarchy from the most-derived type upwards
//! 3. For every type, asks the precompiled indexes first and falls back to
//!    introspection, feeding every candidate through override tracking
//! 4. Caches the result and returns the scratch state to the pool
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use herald_core::{SubscriberMethodFinder, TypeKey, TypeRegistry};
//!
//! let registry = Arc::new(TypeRegistry::new());
//! registry.register::<SettingsScreen>();
//!
//! let finder = SubscriberMethodFinder::builder(registry)
//!     .strict_verification(true)
//!     .build();
//!
//! let methods = finder.find_subscriber_methods(TypeKey::of::<SettingsScreen>())?;
//! ```

mod cache;
mod options;
mod pool;
mod state;

use std::sync::Arc;

use tracing::{debug, debug_span, trace, warn};

pub use options::{DEFAULT_POOL_SIZE, DEFAULT_RESERVED_PREFIXES, FinderOptions};

use self::cache::MethodCache;
use self::pool::FindStatePool;
use self::state::FindState;
use crate::discovery::{SubscriberIndex, SubscriberInfo, TypeIntrospector};
use crate::error::{FinderError, FinderResult, IntrospectionUnsupported};
use crate::foundation::{HandlerMethod, Invoker, MethodDescriptor, TypeKey};

/// Resolves subscriber types into their handler methods.
///
/// # Thread Safety
///
/// `SubscriberMethodFinder` is `Send + Sync`. Resolving different types
/// concurrently never blocks on computation; resolving the same type
/// concurrently may walk the hierarchy twice, and both walks produce equal
/// results.
pub struct SubscriberMethodFinder {
    types: Arc<dyn TypeIntrospector>,
    indexes: Vec<Arc<dyn SubscriberIndex>>,
    options: FinderOptions,
    cache: MethodCache,
    pool: FindStatePool,
}

impl SubscriberMethodFinder {
    /// Creates a finder with default options and no precompiled index.
    pub fn new(types: Arc<dyn TypeIntrospector>) -> Self {
        Self::builder(types).build()
    }

    /// Starts building a finder over `types`.
    pub fn builder(types: Arc<dyn TypeIntrospector>) -> FinderBuilder {
        FinderBuilder {
            types,
            indexes: Vec::new(),
            options: FinderOptions::default(),
        }
    }

    /// Returns the options this finder was built with.
    pub fn options(&self) -> &FinderOptions {
        &self.options
    }

    /// Returns the type introspector.
    pub fn introspector(&self) -> &Arc<dyn TypeIntrospector> {
        &self.types
    }

    /// Resolves every handler method of `subscriber` and its ancestors.
    ///
    /// The returned list is shared with the cache; methods of the most-derived
    /// type come first.
    ///
    /// # Errors
    ///
    /// - [`FinderError::NoEligibleHandlers`] if nothing was found
    /// - [`FinderError::InvalidHandlerSignature`] / [`FinderError::DuplicateHandler`]
    ///   under strict verification
    /// - [`FinderError::AmbiguousOverrideState`] if override tracking
    ///   became inconsistent
    pub fn find_subscriber_methods(
        &self,
        subscriber: TypeKey,
    ) -> FinderResult<Arc<[HandlerMethod]>> {
        if let Some(methods) = self.cache.get(&subscriber) {
            trace!(subscriber = %subscriber, "Subscriber methods served from cache");
            return Ok(methods);
        }

        let span = debug_span!("find_subscriber_methods", subscriber = %subscriber);
        let _enter = span.enter();

        let methods = if self.options.ignore_generated_index {
            self.find_using_introspection(subscriber)?
        } else {
            self.find_using_info(subscriber)?
        };

        if methods.is_empty() {
            return Err(FinderError::NoEligibleHandlers {
                subscriber: subscriber.name(),
            });
        }

        debug!(count = methods.len(), "Resolved subscriber methods");
        self.cache.insert(&subscriber, Arc::clone(&methods));
        Ok(methods)
    }

    /// Purges every cached resolution.
    ///
    /// Meant for hot reload and tests, not for normal operation.
    pub fn clear_caches(&self) {
        debug!("Clearing subscriber method cache");
        self.cache.clear();
    }

    /// Returns the number of cached subscriber types.
    pub fn cached_type_count(&self) -> usize {
        self.cache.len()
    }

    /// Walks the hierarchy consulting precompiled indexes before introspection.
    fn find_using_info(&self, subscriber: TypeKey) -> FinderResult<Arc<[HandlerMethod]>> {
        let mut state = self.pool.acquire();
        state.init_for_subscriber(subscriber);

        while let Some(current) = state.current {
            state.subscriber_info = self.subscriber_info(&state, &current);

            if let Some(info) = state.subscriber_info.clone() {
                trace!(ty = %current, "Using precompiled subscriber info");
                for method in info.handler_methods() {
                    if state.check_add(method.method(), method.message_type(), self.types.as_ref())? {
                        state.subscriber_methods.push(method.clone());
                    }
                }
            } else {
                self.find_using_introspection_in_single_type(&mut state, current)?;
            }

            state.move_to_super_type(self.types.as_ref(), &self.options.reserved_prefixes);
        }

        Ok(Arc::from(state.subscriber_methods.as_slice()))
    }

    /// Walks the hierarchy using introspection only.
    fn find_using_introspection(
        &self,
        subscriber: TypeKey,
    ) -> FinderResult<Arc<[HandlerMethod]>> {
        let mut state = self.pool.acquire();
        state.init_for_subscriber(subscriber);

        while let Some(current) = state.current {
            self.find_using_introspection_in_single_type(&mut state, current)?;
            state.move_to_super_type(self.types.as_ref(), &self.options.reserved_prefixes);
        }

        Ok(Arc::from(state.subscriber_methods.as_slice()))
    }

    /// Looks up precompiled metadata for `current`.
    ///
    /// Metadata linked from the previous step wins if it belongs to exactly
    /// this type; otherwise the indexes are asked in order.
    fn subscriber_info(
        &self,
        state: &FindState,
        current: &TypeKey,
    ) -> Option<Arc<dyn SubscriberInfo>> {
        if let Some(super_info) = state
            .subscriber_info
            .as_ref()
            .and_then(|info| info.super_subscriber_info())
            && super_info.subscriber_type() == *current
        {
            return Some(super_info);
        }

        self.indexes
            .iter()
            .find_map(|index| index.subscriber_info(current))
    }

    fn find_using_introspection_in_single_type(
        &self,
        state: &mut FindState,
        current: TypeKey,
    ) -> FinderResult<()> {
        let methods = match self.types.declared_methods(&current) {
            Ok(methods) => methods,
            Err(IntrospectionUnsupported) => {
                warn!(
                    ty = %current,
                    "Declared methods unavailable, falling back to public methods without scanning ancestors"
                );
                state.skip_super_types = true;
                self.types.public_methods(&current)
            }
        };

        let strict = self.options.strict_verification;

        for method in &methods {
            let Some(marker) = method.get_marker() else {
                continue;
            };

            let (message_type, invoker) = match eligible_shape(method) {
                Ok(shape) => shape,
                Err(reason) if strict => {
                    return Err(FinderError::invalid_signature(
                        method.declaring().name(),
                        method.name(),
                        reason,
                    ));
                }
                Err(reason) => {
                    debug!(
                        declaring = %method.declaring(),
                        method = method.name(),
                        reason = %reason,
                        "Skipping illegal handler method"
                    );
                    continue;
                }
            };

            if let Some(first) = state.check_declared_once(method.id(), message_type) {
                if strict {
                    return Err(FinderError::DuplicateHandler {
                        declaring: method.declaring().name(),
                        message_type: message_type.name(),
                        first,
                        second: method.name(),
                    });
                }
                debug!(
                    declaring = %method.declaring(),
                    method = method.name(),
                    kept = first,
                    "Skipping second handler for the same message type"
                );
                continue;
            }

            if state.check_add(method.id(), message_type, self.types.as_ref())? {
                state.subscriber_methods.push(HandlerMethod::new(
                    method.id(),
                    message_type,
                    *marker,
                    invoker,
                ));
            }
        }

        Ok(())
    }

    #[cfg(test)]
    fn pooled_states(&self) -> usize {
        self.pool.available()
    }
}

/// Checks that a marked method can be a handler.
///
/// Returns its message type and invoker, or why it cannot.
fn eligible_shape(method: &MethodDescriptor) -> Result<(TypeKey, Invoker), String> {
    if !method.is_callable() {
        return Err(
            "handler methods must be public, non-static, non-abstract and not compiler-generated"
                .to_string(),
        );
    }

    let [message_type] = method.param_types() else {
        return Err(format!(
            "handler methods must have exactly 1 parameter but it has {}",
            method.param_types().len()
        ));
    };

    let invoker = method
        .get_invoker()
        .ok_or_else(|| "handler method has no invoker".to_string())?;

    Ok((*message_type, invoker))
}

impl std::fmt::Debug for SubscriberMethodFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberMethodFinder")
            .field("options", &self.options)
            .field("index_count", &self.indexes.len())
            .field("cached_types", &self.cache.len())
            .field("pool_capacity", &self.pool.capacity())
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`SubscriberMethodFinder`].
pub struct FinderBuilder {
    types: Arc<dyn TypeIntrospector>,
    indexes: Vec<Arc<dyn SubscriberIndex>>,
    options: FinderOptions,
}

impl FinderBuilder {
    /// Adds a precompiled index. Indexes are consulted in the order added.
    pub fn index(mut self, index: Arc<dyn SubscriberIndex>) -> Self {
        self.indexes.push(index);
        self
    }

    /// Replaces all options.
    pub fn options(mut self, options: FinderOptions) -> Self {
        self.options = options;
        self
    }

    /// Fail on malformed handler methods instead of skipping them.
    pub fn strict_verification(mut self, strict: bool) -> Self {
        self.options.strict_verification = strict;
        self
    }

    /// Never consult precompiled indexes.
    pub fn ignore_generated_index(mut self, ignore: bool) -> Self {
        self.options.ignore_generated_index = ignore;
        self
    }

    /// Sets the namespaces at which hierarchy walks stop.
    pub fn reserved_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.reserved_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the number of pooled find states.
    pub fn pool_size(mut self, size: usize) -> Self {
        self.options.pool_size = size;
        self
    }

    /// Builds the finder.
    pub fn build(self) -> SubscriberMethodFinder {
        SubscriberMethodFinder {
            types: self.types,
            indexes: self.indexes,
            pool: FindStatePool::new(self.options.pool_size),
            options: self.options,
            cache: MethodCache::default(),
        }
    }
}
