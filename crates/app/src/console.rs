//! Terminal implementations of the screen ports.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Notify;

use brawl_application::{ConsentPrompt, IdentityError, Navigator, Notifier, ProviderCredential};
use brawl_domain::{SignInProvider, Toast, ToastStatus};

/// Prints navigation targets and remembers the last one.
#[derive(Debug, Default)]
pub struct ConsoleNavigator {
    last: Mutex<Option<String>>,
    navigated: Notify,
}

impl ConsoleNavigator {
    /// The most recent navigation target.
    pub fn last(&self) -> Option<String> {
        self.last.lock().clone()
    }

    /// Resolves after the next navigation, or at once if one already
    /// happened.
    pub async fn navigated(&self) {
        let notified = self.navigated.notified();
        if self.last.lock().is_some() {
            return;
        }
        notified.await;
    }
}

impl Navigator for ConsoleNavigator {
    fn push(&self, path: &str) {
        println!("-> {path}");
        *self.last.lock() = Some(path.to_string());
        self.navigated.notify_waiters();
    }
}

/// Writes toasts to stderr.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

/// One-line rendering of a toast.
pub fn render_toast(toast: &Toast) -> String {
    let label = match toast.status {
        ToastStatus::Info => "info",
        ToastStatus::Success => "ok",
        ToastStatus::Warning => "warning",
        ToastStatus::Error => "error",
    };
    if toast.description.is_empty() {
        format!("[{label}] {}", toast.title)
    } else {
        format!("[{label}] {}: {}", toast.title, toast.description)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        eprintln!("{}", render_toast(&toast));
    }
}

/// Asks for the provider's id token on stdin.
///
/// Used in place of a browser popup: the user completes consent elsewhere
/// and pastes the resulting token. An empty line cancels.
#[derive(Debug, Default)]
pub struct StdinConsent;

#[async_trait]
impl ConsentPrompt for StdinConsent {
    async fn request_consent(
        &self,
        provider: &SignInProvider,
    ) -> Result<ProviderCredential, IdentityError> {
        let unavailable = |e: std::io::Error| IdentityError::ProviderUnavailable(e.to_string());
        let mut stderr = tokio::io::stderr();
        let prompt = format!("Paste the {} id token: ", provider.display_name());
        stderr.write_all(prompt.as_bytes()).await.map_err(unavailable)?;
        stderr.flush().await.map_err(unavailable)?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(unavailable)?;

        match line.trim() {
            "" => Err(IdentityError::Cancelled),
            token => Ok(ProviderCredential::id_token(token)),
        }
    }
}
