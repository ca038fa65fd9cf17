use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::domain::events::ChangeEvent;

/// Publish/subscribe registry for change events
///
/// Delivery is best-effort: a closed subscriber is pruned on the next
/// publish and never makes the publisher fail.
#[derive(Default)]
pub struct ChangeNotifier {
    subscribers: Arc<DashMap<Uuid, UnboundedSender<ChangeEvent>>>,
}

/// A live registration; dropping it unsubscribes
pub struct Subscription {
    id: Uuid,
    receiver: UnboundedReceiver<ChangeEvent>,
    subscribers: Arc<DashMap<Uuid, UnboundedSender<ChangeEvent>>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = Uuid::new_v4();
        self.subscribers.insert(id, sender);
        tracing::debug!(subscriber = %id, "Subscriber registered");

        Subscription {
            id,
            receiver,
            subscribers: Arc::clone(&self.subscribers),
        }
    }

    /// Sends `event` to every current subscriber
    ///
    /// Returns how many subscribers received it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let mut failed = Vec::new();
        let mut delivered = 0;

        for entry in self.subscribers.iter() {
            if entry.value().send(event.clone()).is_err() {
                failed.push(*entry.key());
            } else {
                delivered += 1;
            }
        }

        for id in failed {
            self.subscribers.remove(&id);
            tracing::debug!(subscriber = %id, "Pruned closed subscriber");
        }

        tracing::debug!(
            entity = ?event.entity,
            action = ?event.action,
            correlation_id = %event.correlation_id,
            delivered,
            "Change event published"
        );

        delivered
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl Subscription {
    /// Waits for the next event
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscribers.remove(&self.id);
        tracing::debug!(subscriber = %self.id, "Subscriber unregistered");
    }
}
