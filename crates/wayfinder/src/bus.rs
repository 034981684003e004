//! Typed publish/subscribe channel with scoped subscription handles.
//!
//! Observers subscribe and get a [`Subscription`] whose `Drop` unregisters
//! it, so a dropped screen can never have callbacks fired against it.
//! Publishing never blocks: each subscriber has its own unbounded channel
//! and closed subscribers are pruned on the next publish.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tokio::sync::mpsc;
use tracing::trace;

#[derive(Debug)]
struct Registry<T> {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<T>>,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            senders: HashMap::new(),
        }
    }
}

/// A broadcast channel for one event type.
///
/// Cloning the bus shares the subscriber registry, so any clone can publish
/// to all subscribers.
#[derive(Debug)]
pub struct EventBus<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> EventBus<T> {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::new())),
        }
    }

    fn lock(registry: &Mutex<Registry<T>>) -> MutexGuard<'_, Registry<T>> {
        // A poisoned registry only means a publisher panicked mid-send;
        // the map itself stays usable.
        match registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        Self::lock(&self.registry).senders.len()
    }

    /// Register a new subscriber.
    ///
    /// The subscription receives every event published after this call, in
    /// publish order, until it is dropped.
    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = Self::lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.senders.insert(id, tx);
        trace!(id, "bus subscriber registered");
        Subscription {
            id,
            receiver: rx,
            registry: Arc::downgrade(&self.registry),
        }
    }
}

impl<T: Clone> EventBus<T> {
    /// Deliver an event to every live subscriber.
    ///
    /// Returns the number of subscribers reached. Subscribers whose
    /// receiving side has gone away are pruned.
    pub fn publish(&self, event: &T) -> usize {
        let mut registry = Self::lock(&self.registry);
        let mut closed = Vec::new();
        let mut delivered = 0;

        for (id, sender) in &registry.senders {
            if sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*id);
            }
        }
        for id in closed {
            registry.senders.remove(&id);
            trace!(id, "bus subscriber pruned");
        }
        delivered
    }
}

/// A live subscription to an [`EventBus`].
///
/// Dropping the subscription unregisters it from the bus.
#[derive(Debug)]
pub struct Subscription<T> {
    id: u64,
    receiver: mpsc::UnboundedReceiver<T>,
    registry: Weak<Mutex<Registry<T>>>,
}

impl<T> Subscription<T> {
    /// Receive the next event, waiting until one is published.
    ///
    /// Returns `None` once the bus itself has been dropped and all queued
    /// events were consumed.
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            EventBus::lock(&registry).senders.remove(&self.id);
            trace!(id = self.id, "bus subscriber unregistered");
        }
    }
}
