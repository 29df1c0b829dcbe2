//! Runtime wiring: configuration, logging, a type registry and a finder.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use herald_runtime::HeraldRuntime;
//!
//! // Loads herald.toml / HERALD_* from the default locations
//! let runtime = HeraldRuntime::load()?;
//!
//! let handlers = runtime.register::<SettingsScreen>()?;
//! for handler in handlers.iter() {
//!     println!("{} handles {}", handler.name(), handler.message_type());
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use herald_core::{
    GeneratedIndex, HandlerMethod, Subscriber, SubscriberIndex, SubscriberMethodFinder, TypeKey,
    TypeRegistry,
};
use tracing::{debug, info};

use crate::config::{ConfigLoader, HeraldConfig, validate_config};
use crate::error::RuntimeResult;
use crate::logging;

/// Owns the type registry and the finder configured for it.
///
/// Types become resolvable once registered; registering a type records its
/// whole ancestor chain.
pub struct HeraldRuntime {
    config: HeraldConfig,
    registry: Arc<TypeRegistry>,
    finder: SubscriberMethodFinder,
    index_count: usize,
}

impl HeraldRuntime {
    /// Creates a runtime from `config`, initializing logging.
    pub fn new(config: HeraldConfig) -> RuntimeResult<Self> {
        Self::builder(config).build()
    }

    /// Starts building a runtime from `config`.
    pub fn builder(config: HeraldConfig) -> RuntimeBuilder {
        RuntimeBuilder {
            config,
            indexes: Vec::new(),
            init_logging: true,
        }
    }

    /// Loads the configuration from the default locations and builds a runtime.
    pub fn load() -> RuntimeResult<Self> {
        Self::new(ConfigLoader::new().load()?)
    }

    /// Loads the configuration from `path` and builds a runtime.
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> RuntimeResult<Self> {
        Self::new(ConfigLoader::new().file(path).load()?)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &HeraldConfig {
        &self.config
    }

    /// Returns the type registry the finder introspects.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Returns the finder built from the configuration.
    pub fn finder(&self) -> &SubscriberMethodFinder {
        &self.finder
    }

    /// Records the hierarchy of `T` and resolves its handler methods.
    pub fn register<T: Subscriber>(&self) -> RuntimeResult<Arc<[HandlerMethod]>> {
        self.registry.register::<T>();
        self.handlers_for(T::type_key())
    }

    /// Resolves the handler methods of an already-known type.
    pub fn handlers_for(&self, subscriber: TypeKey) -> RuntimeResult<Arc<[HandlerMethod]>> {
        Ok(self.finder.find_subscriber_methods(subscriber)?)
    }

    /// Drops every cached resolution.
    pub fn clear_caches(&self) {
        self.finder.clear_caches();
    }

    /// Returns a snapshot of registry and cache sizes.
    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            registered_types: self.registry.len(),
            cached_types: self.finder.cached_type_count(),
            indexes: self.index_count,
        }
    }
}

impl std::fmt::Debug for HeraldRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeraldRuntime")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Builder for [`HeraldRuntime`].
pub struct RuntimeBuilder {
    config: HeraldConfig,
    indexes: Vec<Arc<dyn SubscriberIndex>>,
    init_logging: bool,
}

impl RuntimeBuilder {
    /// Adds an index, consulted after the generated one.
    pub fn index(mut self, index: Arc<dyn SubscriberIndex>) -> Self {
        self.indexes.push(index);
        self
    }

    /// Whether to install the global logging subscriber (default: true).
    pub fn init_logging(mut self, enabled: bool) -> Self {
        self.init_logging = enabled;
        self
    }

    /// Validates the configuration and builds the runtime.
    pub fn build(self) -> RuntimeResult<HeraldRuntime> {
        validate_config(&self.config)?;

        if self.init_logging {
            logging::init_from_config(&self.config.logging);
        }

        let registry = Arc::new(TypeRegistry::new());
        let mut finder = SubscriberMethodFinder::builder(registry.clone())
            .options(self.config.finder.clone());

        let mut index_count = 0;
        if self.config.finder.ignore_generated_index {
            debug!("Generated index disabled by configuration");
        } else {
            let generated = GeneratedIndex::new();
            debug!(entries = generated.len(), "Using generated subscriber index");
            finder = finder.index(Arc::new(generated));
            index_count += 1;
        }
        for index in self.indexes {
            finder = finder.index(index);
            index_count += 1;
        }

        info!(
            strict_verification = self.config.finder.strict_verification,
            indexes = index_count,
            "Herald runtime initialized"
        );

        Ok(HeraldRuntime {
            finder: finder.build(),
            config: self.config,
            registry,
            index_count,
        })
    }
}

/// Registry and cache sizes of a [`HeraldRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeStats {
    /// Types known to the registry, ancestors included.
    pub registered_types: usize,
    /// Types whose resolution is cached.
    pub cached_types: usize,
    /// Indexes consulted before introspection.
    pub indexes: usize,
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use herald_core::{
        FinderError, HandlerMarker, InvokeResult, SimpleSubscriberIndex, SimpleSubscriberInfo,
        ThreadMode,
    };
    use herald_macros::{Subscriber, handlers};

    use super::*;
    use crate::error::RuntimeError;

    struct Upload;
    struct Shutdown;

    #[derive(Default, Subscriber)]
    struct Service;

    #[handlers(index)]
    impl Service {
        #[subscribe(mode = "background")]
        pub fn on_upload(&self, _upload: &Upload) {}
    }

    #[derive(Default, Subscriber)]
    struct SyncService {
        #[subscriber(parent)]
        service: Service,
    }

    #[handlers]
    impl SyncService {
        #[subscribe(priority = 5)]
        pub fn on_shutdown(&self, _shutdown: &Shutdown) {}
    }

    #[derive(Subscriber)]
    struct Silent;

    #[handlers]
    impl Silent {}

    fn runtime(config: HeraldConfig) -> HeraldRuntime {
        HeraldRuntime::builder(config)
            .init_logging(false)
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_resolves_hierarchy() {
        let runtime = runtime(HeraldConfig::default());
        let methods = runtime.register::<SyncService>().unwrap();

        let names: Vec<_> = methods.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["on_shutdown", "on_upload"]);
        assert_eq!(methods[1].thread_mode(), ThreadMode::Background);

        let stats = runtime.stats();
        assert_eq!(stats.registered_types, 2);
        assert_eq!(stats.cached_types, 1);
        assert_eq!(stats.indexes, 1);
    }

    #[test]
    fn test_handlers_for_and_clear_caches() {
        let runtime = runtime(HeraldConfig::default());
        runtime.register::<Service>().unwrap();

        let first = runtime.handlers_for(TypeKey::of::<Service>()).unwrap();
        let second = runtime.handlers_for(TypeKey::of::<Service>()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        runtime.clear_caches();
        assert_eq!(runtime.stats().cached_types, 0);
        let third = runtime.handlers_for(TypeKey::of::<Service>()).unwrap();
        assert_eq!(&*first, &*third);
    }

    #[test]
    fn test_subscriber_without_handlers() {
        let runtime = runtime(HeraldConfig::default());
        assert!(matches!(
            runtime.register::<Silent>(),
            Err(RuntimeError::Finder(FinderError::NoEligibleHandlers { .. }))
        ));
    }

    #[test]
    fn test_extra_index_is_consulted() {
        fn noop(_: &dyn Any, _: &dyn Any) -> InvokeResult {
            Ok(())
        }

        let info = SimpleSubscriberInfo::new(TypeKey::of::<Silent>()).handler::<Shutdown>(
            "on_shutdown",
            HandlerMarker::new().sticky(true),
            noop,
        );
        let runtime = HeraldRuntime::builder(HeraldConfig::default())
            .init_logging(false)
            .index(Arc::new(SimpleSubscriberIndex::new().with(info)))
            .build()
            .unwrap();

        let methods = runtime.register::<Silent>().unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].message_type(), TypeKey::of::<Shutdown>());
        assert!(methods[0].is_sticky());
        assert_eq!(runtime.stats().indexes, 2);
    }

    #[test]
    fn test_ignore_generated_index() {
        let mut config = HeraldConfig::default();
        config.finder.ignore_generated_index = true;
        let runtime = runtime(config);

        assert_eq!(runtime.stats().indexes, 0);
        assert_eq!(runtime.register::<Service>().unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = HeraldConfig::default();
        config.finder.pool_size = 0;
        assert!(matches!(
            HeraldRuntime::builder(config).init_logging(false).build(),
            Err(RuntimeError::Config(_))
        ));
    }
}
