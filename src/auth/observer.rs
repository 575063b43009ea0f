// Session expiry notification

use parking_lot::RwLock;
use std::sync::Arc;

/// Party interested in learning that the stored credential was rejected
///
/// Called after the credential store has been cleared. May run more than once
/// when several in-flight requests are rejected together, so implementations
/// should tolerate repeats.
pub trait SessionObserver: Send + Sync {
    fn on_session_expired(&self);
}

impl<F> SessionObserver for F
where
    F: Fn() + Send + Sync,
{
    fn on_session_expired(&self) {
        self()
    }
}

/// Single-slot observer registration; the last write wins
#[derive(Clone, Default)]
pub struct ObserverSlot {
    inner: Arc<RwLock<Option<Arc<dyn SessionObserver>>>>,
}

impl ObserverSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the registered observer; `None` clears the slot
    pub fn set(&self, observer: Option<Arc<dyn SessionObserver>>) {
        *self.inner.write() = observer;
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Invoke the current observer once, returning whether one was registered
    pub fn notify(&self) -> bool {
        // Clone out of the lock so the callback can re-register freely
        let observer = self.inner.read().clone();
        match observer {
            Some(observer) => {
                observer.on_session_expired();
                true
            }
            None => false,
        }
    }

    /// Register an observer for the lifetime of the returned guard
    pub fn register(&self, observer: Arc<dyn SessionObserver>) -> ObserverGuard {
        self.set(Some(observer.clone()));
        ObserverGuard {
            slot: self.clone(),
            observer,
        }
    }
}

impl std::fmt::Debug for ObserverSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverSlot")
            .field("registered", &self.is_set())
            .finish()
    }
}

/// Clears the slot on drop, unless another observer replaced it meanwhile
pub struct ObserverGuard {
    slot: ObserverSlot,
    observer: Arc<dyn SessionObserver>,
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        let mut current = self.slot.inner.write();
        let still_ours = current
            .as_ref()
            .is_some_and(|registered| Arc::ptr_eq(registered, &self.observer));
        if still_ours {
            *current = None;
        }
    }
}
