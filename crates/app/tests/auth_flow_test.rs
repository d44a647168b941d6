//! End-to-end auth flows against the in-memory backend.
//!
//! These tests wire the service context the same way the binary does and
//! drive registration, quota checks and the sign-in screen through it.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use brawl_application::{
    AuthService, Bootstrapper, Navigator, Notifier, RuntimeContext, ServiceContext, SignInScreen,
};
use brawl_domain::{
    FieldValue, SessionEvent, SessionHandle, SignInProvider, Toast, USERS_COLLECTION, UserDocument,
};
use brawl_infrastructure::{AppConfig, BackendServiceFactory, SystemClock};

#[derive(Default)]
struct Recorder {
    paths: Mutex<Vec<String>>,
    toasts: Mutex<Vec<Toast>>,
}

impl Navigator for Recorder {
    fn push(&self, path: &str) {
        self.paths.lock().push(path.to_string());
    }
}

impl Notifier for Recorder {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }
}

async fn context() -> ServiceContext {
    let factory = BackendServiceFactory::new(AppConfig::default()).expect("factory");
    Bootstrapper::new()
        .get_or_init(RuntimeContext::Interactive, &factory)
        .await
        .expect("bootstrap")
        .expect("interactive runtime")
}

#[tokio::test]
async fn test_register_writes_profile_and_grants_free_debates() {
    let context = context().await;
    let auth = AuthService::from_context(&context, Arc::new(SystemClock::new()));

    let session = auth
        .register("ada@example.com", "hunter22", "Ada Lovelace", "ada")
        .await
        .unwrap();
    assert_eq!(auth.current_user(), Some(session.clone()));

    let fields = context
        .documents()
        .read_document(USERS_COLLECTION, &session.uid)
        .await
        .unwrap()
        .expect("profile written");
    let profile = UserDocument::from_fields(&fields).unwrap();
    assert_eq!(profile.uid, session.uid);
    assert_eq!(profile.email, "ada@example.com");
    assert_eq!(profile.username, "ada");
    assert_eq!(profile.remaining_free_debates, 3);

    assert!(auth.can_start_new_debate(&session.uid).await);
    assert!(!auth.can_start_new_debate("someone-else").await);
}

#[tokio::test]
async fn test_exhausted_quota_blocks_new_debates() {
    let context = context().await;
    let auth = AuthService::from_context(&context, Arc::new(SystemClock::new()));
    let session = auth
        .register("bob@example.com", "hunter22", "Bob", "bob")
        .await
        .unwrap();

    let mut fields = context
        .documents()
        .read_document(USERS_COLLECTION, &session.uid)
        .await
        .unwrap()
        .unwrap();
    fields.insert("remainingFreeDebates".into(), FieldValue::Integer(0));
    context
        .documents()
        .write_document(USERS_COLLECTION, &session.uid, &fields)
        .await
        .unwrap();

    assert!(!auth.can_start_new_debate(&session.uid).await);
}

#[tokio::test]
async fn test_logout_then_login() {
    let context = context().await;
    let auth = AuthService::from_context(&context, Arc::new(SystemClock::new()));
    let registered = auth
        .register("cy@example.com", "hunter22", "Cy", "cy")
        .await
        .unwrap();

    auth.logout().await.unwrap();
    assert_eq!(auth.current_user(), None);
    assert!(auth.login("cy@example.com", "nope-nope").await.is_err());

    let session = auth.login("cy@example.com", "hunter22").await.unwrap();
    assert_eq!(session.uid, registered.uid);
}

#[tokio::test]
async fn test_sign_in_screen_navigates_once_after_login() {
    let context = context().await;
    let recorder = Arc::new(Recorder::default());
    let screen = SignInScreen::new(
        context.identity(),
        recorder.clone(),
        recorder.clone(),
        "redirect=%2Fdebates",
    );

    let mut watch = screen.mount();
    let first = watch.next().await.unwrap();
    assert_eq!(first, SessionEvent::SignedOut);
    screen.observe(&first);

    // The provider has no registered account yet: the toast is shown.
    assert!(!screen.sign_in().await);
    assert_eq!(recorder.toasts.lock().len(), 1);
    assert!(recorder.paths.lock().is_empty());

    let auth = AuthService::from_context(&context, Arc::new(SystemClock::new()));
    auth.register("dee@example.com", "hunter22", "Dee", "dee")
        .await
        .unwrap();
    let event = watch.next().await.unwrap();
    assert!(screen.observe(&event));

    auth.logout().await.unwrap();
    auth.login("dee@example.com", "hunter22").await.unwrap();
    while let Some(event) = watch.try_next() {
        screen.observe(&event);
    }

    assert_eq!(*recorder.paths.lock(), vec!["/debates".to_string()]);
}

#[tokio::test]
async fn test_non_interactive_runtime_gets_no_services() {
    let factory = BackendServiceFactory::new(AppConfig::default()).unwrap();
    let context = Bootstrapper::new()
        .get_or_init(RuntimeContext::Server, &factory)
        .await
        .unwrap();
    assert!(context.is_none());
}

#[test]
fn test_federated_session_shape() {
    let session = SessionHandle::new("g1", SignInProvider::Google.id());
    assert_eq!(session.provider_id, "google.com");
}
