//! The `cart-updated` notification.
//!
//! In-process listeners that derive anything from a cart subscribe here and
//! re-read the cart store when notified. The signal carries no payload.
//! Dispatch is synchronous and nothing is queued or replayed for late
//! subscribers.
//!
//! There is one subject per process and it is not scoped to a visitor: a
//! listener hears every visitor's changes and must re-read whichever cart it
//! cares about. Browsers never see these notifications. They receive the
//! signal only as an `HX-Trigger: cart-updated` response header on their own
//! requests that change the cart, including a placed order and sign-out.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Name of the notification, also used as the `HX-Trigger` value.
pub const CART_UPDATED: &str = "cart-updated";

type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    listeners: RwLock<BTreeMap<u64, Listener>>,
}

/// Subject for `cart-updated` notifications.
///
/// Cheap to clone; clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct CartEvents {
    registry: Arc<Registry>,
}

impl std::fmt::Debug for CartEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEvents")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl CartEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry.listeners.write().insert(id, Arc::new(listener));
        Subscription {
            id,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Call every current listener, in subscription order.
    ///
    /// Listeners are collected before dispatch, so a listener may subscribe or
    /// unsubscribe without deadlocking.
    pub fn notify(&self) {
        let listeners: Vec<Listener> = self.registry.listeners.read().values().cloned().collect();
        tracing::trace!(subscribers = listeners.len(), "dispatching {CART_UPDATED}");
        for listener in listeners {
            listener();
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.registry.listeners.read().len()
    }
}

/// Handle for a registered listener. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    registry: Arc<Registry>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.listeners.write().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    fn counter(events: &CartEvents) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let subscription = events.subscribe(move || {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (count, subscription)
    }

    #[test]
    fn test_notify_reaches_every_subscriber() {
        let events = CartEvents::new();
        let (badge, _badge_sub) = counter(&events);
        let (page, _page_sub) = counter(&events);

        events.notify();
        events.notify();

        assert_eq!(badge.load(Ordering::SeqCst), 2);
        assert_eq!(page.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let events = CartEvents::new();
        let (count, subscription) = counter(&events);
        assert_eq!(events.subscriber_count(), 1);

        drop(subscription);
        events.notify();

        assert_eq!(events.subscriber_count(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_no_replay_for_late_subscribers() {
        let events = CartEvents::new();
        events.notify();
        let (count, _subscription) = counter(&events);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_clones_share_subscribers() {
        let events = CartEvents::new();
        let (count, _subscription) = counter(&events);
        events.clone().notify();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
