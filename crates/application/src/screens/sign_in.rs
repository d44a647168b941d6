//! Sign-in screen controller.
//!
//! The screen watches the identity service and navigates to the redirect
//! target the first time a session shows up. The sign-in button only
//! starts the provider flow; navigation is always left to the watch, so a
//! session restored from storage and a fresh sign-in take the same path.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use brawl_domain::{SessionEvent, SignInProvider, SignInState, Toast};

use crate::ports::{IdentityService, Navigator, Notifier};
use crate::session::SessionWatch;

/// Query parameter naming the post-sign-in destination.
pub const REDIRECT_PARAM: &str = "redirect";

/// Destination used when the query names none.
pub const DEFAULT_REDIRECT: &str = "/dashboard";

/// Title of the toast shown when interactive sign-in fails.
pub const SIGN_IN_ERROR_TITLE: &str = "Error signing in";

/// Body of the toast shown when interactive sign-in fails.
pub const SIGN_IN_ERROR_DESCRIPTION: &str =
    "An error occurred while signing in. Please try again.";

/// Reads the redirect target from a query string.
///
/// Accepts the query with or without its leading `?`. Missing or empty
/// values fall back to [`DEFAULT_REDIRECT`].
#[must_use]
pub fn redirect_target(query: &str) -> String {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == REDIRECT_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_REDIRECT.to_string())
}

/// What the screen should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignInView {
    /// Heading text.
    pub title: &'static str,
    /// Label of the sign-in button.
    pub button_label: &'static str,
    /// Whether the button shows a spinner and ignores clicks.
    pub loading: bool,
}

/// Controller for the sign-in screen.
pub struct SignInScreen {
    identity: Arc<dyn IdentityService>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    provider: SignInProvider,
    redirect: String,
    state: Mutex<SignInState>,
    loading: AtomicBool,
}

impl SignInScreen {
    /// Creates the controller for a request with the given query string.
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityService>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        query: &str,
    ) -> Self {
        Self {
            identity,
            navigator,
            notifier,
            provider: SignInProvider::Google,
            redirect: redirect_target(query),
            state: Mutex::new(SignInState::default()),
            loading: AtomicBool::new(false),
        }
    }

    /// Uses a different provider for the sign-in button.
    #[must_use]
    pub fn with_provider(mut self, provider: SignInProvider) -> Self {
        self.provider = provider;
        self
    }

    /// Where the screen navigates after sign-in.
    #[must_use]
    pub fn redirect(&self) -> &str {
        &self.redirect
    }

    /// Current authentication state.
    #[must_use]
    pub fn state(&self) -> SignInState {
        *self.state.lock()
    }

    /// Returns true while an interactive sign-in is running.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Render model for the current state.
    #[must_use]
    pub fn view(&self) -> SignInView {
        let loading = self.is_loading();
        SignInView {
            title: "Sign In to DebateBrawl",
            button_label: if loading {
                "Signing In"
            } else {
                "Sign in with Google"
            },
            loading,
        }
    }

    /// Subscribes to session changes. Drop or unsubscribe the watch when
    /// the screen goes away.
    #[must_use]
    pub fn mount(&self) -> SessionWatch {
        self.identity.watch_session()
    }

    /// Applies one session event.
    ///
    /// Returns true if this event triggered navigation.
    pub fn observe(&self, event: &SessionEvent) -> bool {
        let fired = {
            let mut state = self.state.lock();
            let (next, fired) = state.observe(event.session().is_some());
            *state = next;
            fired
        };

        if fired {
            tracing::info!(redirect = %self.redirect, "session detected, navigating");
            self.navigator.push(&self.redirect);
        }
        fired
    }

    /// Consumes `watch` until it is unsubscribed.
    pub async fn run(&self, mut watch: SessionWatch) {
        while let Some(event) = watch.next().await {
            self.observe(&event);
        }
        tracing::debug!("sign-in screen unsubscribed");
    }

    /// Starts the provider's interactive sign-in.
    ///
    /// Returns true if the provider signed the user in. Failures are shown
    /// as a generic error toast.
    pub async fn sign_in(&self) -> bool {
        self.loading.store(true, Ordering::SeqCst);

        let succeeded = match self.identity.interactive_sign_in(&self.provider).await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(provider = %self.provider, error = %e, "error signing in");
                self.notifier
                    .notify(Toast::error(SIGN_IN_ERROR_TITLE, SIGN_IN_ERROR_DESCRIPTION));
                false
            }
        };

        self.loading.store(false, Ordering::SeqCst);
        succeeded
    }
}

impl std::fmt::Debug for SignInScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInScreen")
            .field("provider", &self.provider)
            .field("redirect", &self.redirect)
            .field("state", &self.state())
            .field("loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ports::{IdentityError, Persistence};
    use crate::session::SessionCache;
    use async_trait::async_trait;
    use brawl_domain::{SessionHandle, ToastStatus};
    use pretty_assertions::assert_eq;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct StubIdentity {
        cache: SessionCache,
        outcome: Mutex<Option<Result<SessionHandle, IdentityError>>>,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl IdentityService for StubIdentity {
        async fn create_account(&self, _: &str, _: &str) -> Result<SessionHandle, IdentityError> {
            Err(IdentityError::Provider("unused".into()))
        }

        async fn authenticate(&self, _: &str, _: &str) -> Result<SessionHandle, IdentityError> {
            Err(IdentityError::Provider("unused".into()))
        }

        async fn end_session(&self) -> Result<(), IdentityError> {
            self.cache.sign_out().await;
            Ok(())
        }

        fn current_session(&self) -> Option<SessionHandle> {
            self.cache.current()
        }

        fn watch_session(&self) -> SessionWatch {
            self.cache.watch()
        }

        async fn interactive_sign_in(
            &self,
            _: &SignInProvider,
        ) -> Result<SessionHandle, IdentityError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            let outcome = self
                .outcome
                .lock()
                .take()
                .unwrap_or(Err(IdentityError::Cancelled));
            if let Ok(session) = &outcome {
                self.cache.sign_in(session.clone()).await;
            }
            outcome
        }

        async fn set_persistence(&self, _: Persistence) -> Result<(), IdentityError> {
            Ok(())
        }
    }

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

    fn session() -> SessionHandle {
        SessionHandle::new("u1", "google.com")
    }

    fn screen(identity: Arc<StubIdentity>, recorder: &Arc<Recorder>, query: &str) -> SignInScreen {
        SignInScreen::new(identity, recorder.clone(), recorder.clone(), query)
    }

    #[test]
    fn test_redirect_target() {
        assert_eq!(redirect_target(""), "/dashboard");
        assert_eq!(redirect_target("?redirect="), "/dashboard");
        assert_eq!(redirect_target("redirect=%2Fdebates%2F42"), "/debates/42");
        assert_eq!(redirect_target("?a=1&redirect=/billing&b=2"), "/billing");
        assert_eq!(redirect_target("?other=/x"), "/dashboard");
    }

    #[tokio::test]
    async fn test_navigates_once_for_repeated_sessions() {
        let identity = Arc::new(StubIdentity::default());
        identity.cache.sign_in(session()).await;
        let recorder = Arc::new(Recorder::default());
        let screen = screen(identity.clone(), &recorder, "?redirect=/debates/new");

        let watch = screen.mount();
        let unmount = watch.unsubscribe_handle();
        identity.cache.sign_in(session()).await;
        unmount.unsubscribe();

        screen.run(watch).await;

        assert_eq!(*recorder.paths.lock(), vec!["/debates/new".to_string()]);
        assert_eq!(screen.state(), SignInState::Authenticated);
        assert_eq!(identity.cache.watcher_count(), 0);
    }

    #[tokio::test]
    async fn test_defaults_to_dashboard() {
        let identity = Arc::new(StubIdentity::default());
        let recorder = Arc::new(Recorder::default());
        let screen = screen(identity.clone(), &recorder, "");

        let mut watch = screen.mount();
        let event = watch.next().await.unwrap();
        assert!(!screen.observe(&event));
        assert!(recorder.paths.lock().is_empty());

        identity.cache.sign_in(session()).await;
        let event = watch.next().await.unwrap();
        assert!(screen.observe(&event));
        assert_eq!(*recorder.paths.lock(), vec!["/dashboard".to_string()]);
    }

    #[tokio::test]
    async fn test_successful_sign_in_leaves_navigation_to_watch() {
        let identity = Arc::new(StubIdentity {
            outcome: Mutex::new(Some(Ok(session()))),
            ..StubIdentity::default()
        });
        let recorder = Arc::new(Recorder::default());
        let screen = screen(identity, &recorder, "");
        let mut watch = screen.mount();

        assert!(screen.sign_in().await);
        assert!(!screen.is_loading());
        assert!(recorder.paths.lock().is_empty());
        assert!(recorder.toasts.lock().is_empty());

        while let Some(event) = watch.try_next() {
            screen.observe(&event);
        }
        assert_eq!(*recorder.paths.lock(), vec!["/dashboard".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_sign_in_shows_toast() {
        let identity = Arc::new(StubIdentity {
            outcome: Mutex::new(Some(Err(IdentityError::Network("offline".into())))),
            ..StubIdentity::default()
        });
        let recorder = Arc::new(Recorder::default());
        let screen = screen(identity, &recorder, "");

        assert!(!screen.sign_in().await);
        assert!(!screen.is_loading());

        let toasts = recorder.toasts.lock();
        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts[0].title, SIGN_IN_ERROR_TITLE);
        assert_eq!(toasts[0].description, SIGN_IN_ERROR_DESCRIPTION);
        assert_eq!(toasts[0].status, ToastStatus::Error);
        assert!(recorder.paths.lock().is_empty());
    }

    #[tokio::test]
    async fn test_loading_flag_during_sign_in() {
        let gate = Arc::new(Notify::new());
        let identity = Arc::new(StubIdentity {
            outcome: Mutex::new(Some(Ok(session()))),
            gate: Some(gate.clone()),
            ..StubIdentity::default()
        });
        let recorder = Arc::new(Recorder::default());
        let screen = screen(identity, &recorder, "");
        assert_eq!(screen.view().button_label, "Sign in with Google");

        let check = async {
            tokio::task::yield_now().await;
            let view = screen.view();
            assert!(view.loading);
            assert_eq!(view.button_label, "Signing In");
            gate.notify_one();
        };
        let (signed_in, ()) = tokio::join!(screen.sign_in(), check);

        assert!(signed_in);
        assert!(!screen.view().loading);
    }
}
