//! Navigation and notification ports used by screens.

use brawl_domain::Toast;

/// Moves the user to another screen.
pub trait Navigator: Send + Sync {
    /// Navigates to `path`.
    fn push(&self, path: &str);
}

/// Shows transient notifications.
pub trait Notifier: Send + Sync {
    /// Displays `toast`.
    fn notify(&self, toast: Toast);
}
