//! Synchronous publish/subscribe channel for [`ProcessingEvent`]s.
//!
//! Subscribers are kept in registration order and called on the publishing
//! thread before `publish` returns. The registry lock is released while
//! callbacks run, so a callback may subscribe or unsubscribe (itself or
//! others) without deadlocking.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use super::events::ProcessingEvent;

type Callback<B> = Arc<dyn Fn(&ProcessingEvent<'_, B>) + Send + Sync>;

/// Identifier of one subscription. Ids grow monotonically, so ordering by
/// id is registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Registry<B> {
    next_id: u64,
    subscribers: BTreeMap<SubscriptionId, Callback<B>>,
}

/// Registry operations a [`Subscription`] needs, erased over the buffer type.
trait Detach: Send + Sync {
    fn detach(&self, id: SubscriptionId) -> bool;
    fn contains(&self, id: SubscriptionId) -> bool;
}

impl<B> Detach for Mutex<Registry<B>> {
    fn detach(&self, id: SubscriptionId) -> bool {
        self.lock().subscribers.remove(&id).is_some()
    }

    fn contains(&self, id: SubscriptionId) -> bool {
        self.lock().subscribers.contains_key(&id)
    }
}

pub struct EventBus<B> {
    registry: Arc<Mutex<Registry<B>>>,
}

impl<B: 'static> EventBus<B> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                subscribers: BTreeMap::new(),
            })),
        }
    }

    /// Register `callback` for every subsequent event. Delivery stops when
    /// the returned handle is unsubscribed or dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ProcessingEvent<'_, B>) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock();
            let id = SubscriptionId(registry.next_id);
            registry.next_id += 1;
            registry.subscribers.insert(id, Arc::new(callback));
            id
        };
        trace!(%id, "subscribed");

        let registry: Arc<dyn Detach> = self.registry.clone();
        Subscription {
            id,
            registry: Arc::downgrade(&registry),
        }
    }

    /// Deliver `event` to every current subscriber, in registration order.
    pub fn publish(&self, event: &ProcessingEvent<'_, B>) {
        let snapshot: Vec<(SubscriptionId, Callback<B>)> = {
            let registry = self.registry.lock();
            registry
                .subscribers
                .iter()
                .map(|(id, callback)| (*id, Arc::clone(callback)))
                .collect()
        };

        for (id, callback) in snapshot {
            // Skip anyone unsubscribed by an earlier callback of this broadcast.
            if !self.registry.contains(id) {
                continue;
            }
            callback(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.lock().subscribers.len()
    }
}

impl<B: 'static> Default for EventBus<B> {
    fn default() -> Self {
        Self::new()
    }
}

/// Revocable handle returned by [`EventBus::subscribe`].
///
/// Dropping the handle unsubscribes. [`unsubscribe`](Self::unsubscribe) may
/// be called any number of times.
#[must_use = "dropping a Subscription unsubscribes it immediately"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<dyn Detach>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn unsubscribe(&self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.detach(self.id) {
                trace!(id = %self.id, "unsubscribed");
            }
        }
    }

    /// Whether the subscriber is still registered with a live bus.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
