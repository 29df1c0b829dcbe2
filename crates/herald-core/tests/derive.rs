use std::any::TypeId;
use std::sync::Arc;

use herald_core::{
    DeclaresHandlers, FinderError, GeneratedIndex, HandlerMethod, InvokeError, MethodFlags,
    Subscriber, SubscriberIndex, SubscriberInfo, SubscriberMethodFinder, ThreadMode, TypeKey,
    TypeRegistry, Visibility,
};
use herald_macros::{Subscriber, handlers};
use parking_lot::Mutex;

pub struct ThemeChanged {
    pub dark: bool,
}

pub struct AccountLoaded {
    pub user: &'static str,
}

pub struct Tick;

#[derive(Default, Subscriber)]
pub struct Screen {
    log: Mutex<Vec<String>>,
}

#[handlers(index)]
impl Screen {
    #[subscribe(mode = "main")]
    pub fn on_theme(&self, theme: &ThemeChanged) {
        self.log.lock().push(format!("screen.theme dark={}", theme.dark));
    }

    #[subscribe(mode = "background", priority = -1)]
    pub fn on_tick(&self, _tick: &Tick) {
        self.log.lock().push("screen.tick".to_string());
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().clone()
    }
}

#[derive(Default, Subscriber)]
#[subscriber(name = "app::screens::Settings")]
pub struct SettingsScreen {
    #[subscriber(parent)]
    screen: Screen,
}

#[handlers]
impl SettingsScreen {
    #[subscribe(priority = 10, sticky)]
    pub fn on_account(&self, account: &AccountLoaded) {
        self.log.lock().push(format!("settings.account {}", account.user));
    }

    #[subscribe(mode = "async")]
    pub fn on_theme(&self, _theme: &ThemeChanged) {
        self.log.lock().push("settings.theme".to_string());
    }

    #[subscribe]
    fn on_private(&self, _tick: &Tick) {}

    #[subscribe]
    pub fn on_static(_tick: &Tick) {}
}

pub struct Upload {
    pub bytes: usize,
}

#[derive(Default, Subscriber)]
pub struct Uploader;

#[handlers]
impl Uploader {
    #[subscribe]
    pub fn on_upload(&self, upload: &Upload) -> Result<(), String> {
        if upload.bytes > 1024 {
            return Err(format!("upload of {} bytes exceeds quota", upload.bytes));
        }
        Ok(())
    }
}

#[derive(Subscriber)]
pub struct Embedded(#[subscriber(parent)] Screen);

impl DeclaresHandlers for Embedded {}

fn found(methods: &[HandlerMethod]) -> Vec<(TypeKey, &'static str)> {
    methods
        .iter()
        .map(|method| (method.declaring_type(), method.name()))
        .collect()
}

#[test]
fn test_derive_describes_hierarchy() {
    let descriptor = SettingsScreen::describe();

    assert_eq!(descriptor.key().name(), "app::screens::Settings");
    assert_eq!(SettingsScreen::type_key(), TypeKey::of::<SettingsScreen>());
    assert_eq!(
        descriptor.parent().map(|link| link.key),
        Some(TypeKey::of::<Screen>())
    );
    assert_eq!(descriptor.methods().methods().len(), 4);
    assert!(Screen::describe().parent().is_none());
}

#[test]
fn test_handlers_record_methods_as_written() {
    let methods = SettingsScreen::declared_methods();
    let by_name = |name: &str| {
        methods
            .iter()
            .find(|method| method.name() == name)
            .unwrap_or_else(|| panic!("missing method {name}"))
    };

    let account = by_name("on_account");
    let marker = account.get_marker().unwrap();
    assert_eq!(marker.priority, 10);
    assert!(marker.sticky);
    assert_eq!(marker.thread_mode, ThreadMode::Posting);
    assert_eq!(account.param_types(), &[TypeKey::of::<AccountLoaded>()]);
    assert!(account.get_invoker().is_some());

    assert_eq!(
        by_name("on_theme").get_marker().unwrap().thread_mode,
        ThreadMode::Async
    );
    assert_eq!(
        by_name("on_private").get_visibility(),
        Visibility::Restricted
    );

    let on_static = by_name("on_static");
    assert!(on_static.get_flags().contains(MethodFlags::STATIC));
    assert!(on_static.get_invoker().is_none());

    // Unmarked methods are not part of the table.
    assert!(Screen::declared_methods().iter().all(|m| m.name() != "entries"));
}

#[test]
fn test_resolution_through_macros() {
    let registry = Arc::new(TypeRegistry::new());
    registry.register::<SettingsScreen>();
    assert!(registry.contains(&TypeKey::of::<Screen>()));

    let finder = SubscriberMethodFinder::new(registry);
    let methods = finder
        .find_subscriber_methods(TypeKey::of::<SettingsScreen>())
        .unwrap();

    let settings = TypeKey::of::<SettingsScreen>();
    let screen = TypeKey::of::<Screen>();
    assert_eq!(
        found(&methods),
        vec![
            (settings, "on_account"),
            (settings, "on_theme"),
            (screen, "on_tick"),
        ]
    );
    assert_eq!(methods[2].priority(), -1);
    assert_eq!(methods[2].thread_mode(), ThreadMode::Background);
}

#[test]
fn test_invoke_through_derived_instance() {
    let registry = Arc::new(TypeRegistry::new());
    registry.register::<SettingsScreen>();
    let finder = SubscriberMethodFinder::new(registry);
    let methods = finder
        .find_subscriber_methods(TypeKey::of::<SettingsScreen>())
        .unwrap();

    let settings = SettingsScreen::default();
    methods[0]
        .invoke(&settings, &AccountLoaded { user: "ada" })
        .unwrap();
    methods[1]
        .invoke(&settings, &ThemeChanged { dark: true })
        .unwrap();
    methods[2].invoke(&settings, &Tick).unwrap();

    assert_eq!(
        settings.entries(),
        vec!["settings.account ada", "settings.theme", "screen.tick"]
    );
    assert!(methods[2].invoke(&settings, &ThemeChanged { dark: false }).is_err());
}

#[test]
fn test_strict_verification_rejects_private_handler() {
    let registry = Arc::new(TypeRegistry::new());
    registry.register::<SettingsScreen>();
    let finder = SubscriberMethodFinder::builder(registry)
        .strict_verification(true)
        .build();

    assert!(matches!(
        finder.find_subscriber_methods(TypeKey::of::<SettingsScreen>()),
        Err(FinderError::InvalidHandlerSignature { method: "on_private", .. })
    ));
}

#[test]
fn test_generated_index_contains_indexed_types_only() {
    let index = GeneratedIndex::new();

    let info = index
        .subscriber_info(&TypeKey::of::<Screen>())
        .expect("Screen is indexed");
    assert_eq!(info.subscriber_type(), TypeKey::of::<Screen>());
    assert_eq!(info.handler_methods().len(), 2);

    assert!(index.subscriber_info(&TypeKey::of::<SettingsScreen>()).is_none());
}

#[test]
fn test_generated_index_and_introspection_agree() {
    let registry = Arc::new(TypeRegistry::new());
    registry.register::<Screen>();

    let indexed = SubscriberMethodFinder::builder(registry.clone())
        .index(Arc::new(GeneratedIndex::new()))
        .build();
    let introspected = SubscriberMethodFinder::new(registry);

    let key = TypeKey::of::<Screen>();
    assert_eq!(
        &*indexed.find_subscriber_methods(key).unwrap(),
        &*introspected.find_subscriber_methods(key).unwrap()
    );
}

#[test]
fn test_tuple_struct_parent() {
    let embedded = Embedded(Screen::default());

    assert!(embedded.upcast(TypeId::of::<Screen>()).is_some());
    assert!(embedded.upcast(TypeId::of::<SettingsScreen>()).is_none());

    let registry = Arc::new(TypeRegistry::new());
    registry.register::<Embedded>();
    let finder = SubscriberMethodFinder::new(registry);
    let methods = finder
        .find_subscriber_methods(TypeKey::of::<Embedded>())
        .unwrap();
    assert_eq!(methods.len(), 2);

    for method in methods.iter() {
        if method.message_type() == TypeKey::of::<Tick>() {
            method.invoke(&embedded, &Tick).unwrap();
        }
    }
    // Deref reaches the embedded parent.
    assert_eq!(embedded.entries(), vec!["screen.tick"]);
}

#[test]
fn test_handler_error_is_propagated() {
    let registry = Arc::new(TypeRegistry::new());
    registry.register::<Uploader>();
    let finder = SubscriberMethodFinder::new(registry);
    let methods = finder
        .find_subscriber_methods(TypeKey::of::<Uploader>())
        .unwrap();

    assert_eq!(methods[0].invoke(&Uploader, &Upload { bytes: 10 }), Ok(()));
    assert_eq!(
        methods[0].invoke(&Uploader, &Upload { bytes: 4096 }),
        Err(InvokeError::HandlerFailed {
            reason: "upload of 4096 bytes exceeds quota".to_string()
        })
    );
}
