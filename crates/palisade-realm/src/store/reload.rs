//! Store reload notifications.
//!
//! Backing stores are reloaded out-of-band (a file watcher, an admin action);
//! dependent caches must be invalidated as soon as a reload happens. A
//! [`ReloadNotifier`] is the registry a store exposes for that signal:
//! listeners registered through [`ReloadNotifier::subscribe`] run inside
//! [`ReloadNotifier::notify`], so by the time `notify()` returns every
//! dependent cache has been invalidated. Dropping the returned
//! [`Subscription`] releases the listener; there is no global registry.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, Weak};

/// A reload listener. Invoked synchronously on every notification.
pub type ReloadListener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    listeners: RwLock<HashMap<u64, ReloadListener>>,
    next_id: AtomicU64,
}

// =============================================================================
// Reload Notifier
// =============================================================================

/// Registry of listeners interested in a store's reload signal.
///
/// Multiple listeners can subscribe; every [`notify`](Self::notify) call
/// invokes all of them before returning. A listener runs on the notifying
/// thread, so it must not block for long; typically it does nothing more than
/// clear a cache.
#[derive(Clone, Default)]
pub struct ReloadNotifier {
    registry: Arc<Registry>,
}

impl ReloadNotifier {
    /// Creates a notifier with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns its [`Subscription`].
    ///
    /// The listener stays registered until the subscription is dropped.
    #[must_use]
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::new(listener));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Notifies every registered listener that the store reloaded.
    ///
    /// Listeners run synchronously: when this method returns, all of them
    /// have observed the signal.
    pub fn notify(&self) {
        let listeners: Vec<ReloadListener> = self
            .registry
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        tracing::debug!(listeners = listeners.len(), "store reload notification");
        for listener in listeners {
            listener();
        }
    }

    /// The number of currently registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

// =============================================================================
// Subscription
// =============================================================================

/// Handle to a registered reload listener.
///
/// Dropping the subscription unregisters the listener. The handle holds only
/// a weak reference to the notifier, so it never keeps a dropped store's
/// registry alive.
pub struct Subscription {
    id: u64,
    registry: Weak<Registry>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .listeners
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }
}
