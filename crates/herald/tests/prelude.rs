use herald::prelude::*;
use herald::runtime::config::LogLevel;

pub struct Connected;

pub struct Disconnected;

#[derive(Default, Subscriber)]
pub struct Session;

#[handlers(index)]
impl Session {
    #[subscribe(mode = "background")]
    pub fn on_connected(&self, _event: &Connected) {}

    #[subscribe(mode = "background")]
    pub fn on_disconnected(&self, _event: &Disconnected) {}
}

#[derive(Default, Subscriber)]
pub struct AuditedSession {
    #[subscriber(parent)]
    session: Session,
}

#[handlers]
impl AuditedSession {
    #[subscribe(priority = 100)]
    pub fn on_connected(&self, _event: &Connected) {}
}

fn runtime() -> HeraldRuntime {
    let mut config = HeraldConfig::default();
    config.logging.level = LogLevel::Warn;
    HeraldRuntime::builder(config)
        .init_logging(false)
        .build()
        .unwrap()
}

#[test]
fn test_override_through_facade() {
    let runtime = runtime();
    let methods = runtime.register::<AuditedSession>().unwrap();

    let found: Vec<_> = methods
        .iter()
        .map(|m| (m.declaring_type(), m.name()))
        .collect();
    assert_eq!(
        found,
        vec![
            (AuditedSession::type_key(), "on_connected"),
            (Session::type_key(), "on_disconnected"),
        ]
    );
    assert_eq!(methods[0].priority(), 100);
}

#[test]
fn test_generated_index_is_wired() {
    let runtime = runtime();
    assert_eq!(runtime.stats().indexes, 1);

    let methods = runtime.register::<Session>().unwrap();
    assert_eq!(methods.len(), 2);
    assert!(
        methods
            .iter()
            .all(|m| m.thread_mode() == ThreadMode::Background)
    );
}
