//! Configuration event bus
//!
//! A session-scoped publish/subscribe channel used to push configuration
//! changes into feed loops that are already running. Delivery is fan-out
//! only: there is no queue and late subscribers never see earlier events.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Configuration changes broadcast to running feeds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigEvent {
    /// New frame preview cadence in frames per second
    FpsChanged(f64),
    /// New segment length in seconds
    SegmentLengthChanged(f64),
}

/// Handle returned by [`ConfigBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Subscription that is removed from its bus when dropped
pub struct Subscription {
    bus: Arc<ConfigBus>,
    id: SubscriptionId,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

type ConfigHandler = Arc<dyn Fn(&ConfigEvent) + Send + Sync>;

/// Synchronous fan-out of [`ConfigEvent`]s to registered handlers
pub struct ConfigBus {
    handlers: RwLock<Vec<(SubscriptionId, ConfigHandler)>>,
    next_id: AtomicU64,
}

impl ConfigBus {
    /// Create an empty bus
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a handler; it runs on every subsequent publish
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ConfigEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().push((id, Arc::new(handler)));
        id
    }

    /// Like [`ConfigBus::subscribe`], but unsubscribes when the guard drops
    pub fn subscribe_scoped<F>(self: &Arc<Self>, handler: F) -> Subscription
    where
        F: Fn(&ConfigEvent) + Send + Sync + 'static,
    {
        Subscription {
            bus: Arc::clone(self),
            id: self.subscribe(handler),
        }
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Invoke every current handler in subscription order.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, event: ConfigEvent) -> usize {
        // Snapshot so handlers may touch the bus themselves.
        let handlers: Vec<ConfigHandler> = self
            .handlers
            .read()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        tracing::debug!("Publishing {:?} to {} subscriber(s)", event, handlers.len());

        for handler in &handlers {
            handler(&event);
        }
        handlers.len()
    }

    /// Number of registered handlers
    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().len()
    }
}

impl Default for ConfigBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let bus = ConfigBus::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            bus.subscribe(move |_| calls.lock().push(name));
        }

        assert_eq!(bus.publish(ConfigEvent::FpsChanged(5.0)), 3);
        assert_eq!(*calls.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_each_publish_delivers_once() {
        let bus = ConfigBus::new();
        let count = Arc::new(AtomicU64::new(0));
        let seen = Arc::clone(&count);
        bus.subscribe(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        bus.publish(ConfigEvent::FpsChanged(1.0));
        bus.publish(ConfigEvent::SegmentLengthChanged(2.0));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_late_subscriber_gets_no_replay() {
        let bus = ConfigBus::new();
        bus.publish(ConfigEvent::FpsChanged(3.0));

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(move |event| sink.lock().push(*event));
        assert!(seen.lock().is_empty());

        bus.publish(ConfigEvent::FpsChanged(4.0));
        assert_eq!(*seen.lock(), vec![ConfigEvent::FpsChanged(4.0)]);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = ConfigBus::new();
        let id = bus.subscribe(|_| {});
        assert_eq!(bus.subscriber_count(), 1);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.publish(ConfigEvent::FpsChanged(1.0)), 0);
    }

    #[test]
    fn test_scoped_subscription_drops() {
        let bus = Arc::new(ConfigBus::new());
        let subscription = bus.subscribe_scoped(|_| {});
        assert_eq!(bus.subscriber_count(), 1);
        drop(subscription);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_handler_may_subscribe_during_publish() {
        let bus = Arc::new(ConfigBus::new());
        let inner = Arc::clone(&bus);
        bus.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        assert_eq!(bus.publish(ConfigEvent::FpsChanged(1.0)), 1);
        assert_eq!(bus.subscriber_count(), 2);
    }
}
