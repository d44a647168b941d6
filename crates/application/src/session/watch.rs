//! Cancellable subscriptions to session-presence changes.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use brawl_domain::{SessionEvent, SessionHandle};

type Watchers = HashMap<u64, mpsc::UnboundedSender<SessionEvent>>;

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    watchers: Watchers,
}

/// Fans session changes out to every live [`SessionWatch`].
#[derive(Debug, Clone, Default)]
pub struct SessionNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl SessionNotifier {
    /// Creates a notifier with no watchers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a watcher whose first event is `current`.
    #[must_use]
    pub fn subscribe(&self, current: Option<SessionHandle>) -> SessionWatch {
        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive, so the initial send cannot fail.
        let _ = tx.send(SessionEvent::from(current));

        let mut registry = self.registry.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.watchers.insert(id, tx);

        SessionWatch {
            id,
            events: rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Delivers the new session state to all watchers.
    ///
    /// Watchers whose receiving side is gone are pruned.
    pub fn publish(&self, session: Option<&SessionHandle>) {
        let event = SessionEvent::from(session.cloned());
        let mut registry = self.registry.lock();
        registry
            .watchers
            .retain(|_, tx| tx.send(event.clone()).is_ok());
        tracing::debug!(
            watchers = registry.watchers.len(),
            signed_in = session.is_some(),
            "published session change"
        );
    }

    /// Number of live watchers.
    #[must_use]
    pub fn watcher_count(&self) -> usize {
        self.registry.lock().watchers.len()
    }
}

/// A live subscription to session changes.
///
/// Events arrive in publication order. The subscription ends when
/// [`SessionWatch::unsubscribe`] is called, when an [`Unsubscribe`] handle
/// fires, or when the watch is dropped; [`SessionWatch::next`] then drains
/// any buffered events and returns `None`.
#[derive(Debug)]
pub struct SessionWatch {
    id: u64,
    events: mpsc::UnboundedReceiver<SessionEvent>,
    registry: Weak<Mutex<Registry>>,
}

impl SessionWatch {
    /// Waits for the next session event.
    pub async fn next(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Returns a buffered event without waiting.
    pub fn try_next(&mut self) -> Option<SessionEvent> {
        self.events.try_recv().ok()
    }

    /// A handle that ends this subscription from elsewhere.
    #[must_use]
    pub fn unsubscribe_handle(&self) -> Unsubscribe {
        Unsubscribe {
            id: self.id,
            registry: self.registry.clone(),
        }
    }

    /// Ends the subscription.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        remove_watcher(&self.registry, self.id);
    }
}

/// Ends a [`SessionWatch`] without owning it.
#[derive(Debug, Clone)]
pub struct Unsubscribe {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Unsubscribe {
    /// Stops delivery to the associated watch. Idempotent.
    pub fn unsubscribe(&self) {
        remove_watcher(&self.registry, self.id);
    }
}

fn remove_watcher(registry: &Weak<Mutex<Registry>>, id: u64) {
    if let Some(registry) = registry.upgrade() {
        registry.lock().watchers.remove(&id);
    }
}
