//! Session tracking shared by identity adapters.
//!
//! This module provides:
//! - Cancellable subscriptions to session changes
//! - An in-process session cache with optional durable persistence

mod cache;
mod watch;

pub use cache::SessionCache;
pub use watch::{SessionNotifier, SessionWatch, Unsubscribe};
