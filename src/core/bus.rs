use crate::core::event::Event;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, error};
use uuid::Uuid;

type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

/// Opaque handle for one registration. Backed by a random 128-bit id, so
/// tokens are never reused across the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionToken(Uuid);

/// Subscriber registry with asynchronous fan-out.
///
/// Reads (publish snapshots) share the lock; subscribe/unsubscribe take it
/// exclusively. Publishing copies the handler list out under the read lock
/// and releases it before any handler runs, so mutation during delivery can
/// never corrupt iteration.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<HashMap<SubscriptionToken, Handler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for future events and return its token.
    ///
    /// A registration racing an in-flight `publish` may or may not observe
    /// that particular event; no ordering guarantee is made.
    pub fn subscribe(&self, handler: impl Fn(&Event) + Send + Sync + 'static) -> SubscriptionToken {
        let token = SubscriptionToken(Uuid::new_v4());
        self.write_guard().insert(token, Arc::new(handler));
        token
    }

    /// Drop the registration for `token`. Unknown or already-removed tokens
    /// are ignored.
    pub fn unsubscribe(&self, token: SubscriptionToken) {
        if self.write_guard().remove(&token).is_none() {
            debug!(?token, "unsubscribe for unknown token, ignoring");
        }
    }

    /// Deliver `event` to every handler registered at the moment the snapshot
    /// is taken, each on its own task. Returns without waiting on any
    /// handler.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn publish(&self, event: Event) {
        let snapshot: Vec<Handler> = {
            let subscribers = self
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            subscribers.values().cloned().collect()
        };

        debug!(?event, handlers = snapshot.len(), "publishing event");

        for handler in snapshot {
            let event = event.clone();
            tokio::spawn(async move {
                // A panicking handler is this task's problem alone.
                if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                    error!(?event, "event handler panicked during delivery");
                }
            });
        }
    }

    /// Number of live registrations.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn write_guard(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<SubscriptionToken, Handler>> {
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
