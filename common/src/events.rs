//! In-process event bus (C8).
//!
//! The original service publishes to Kafka topics (`gateway.<code>.events`,
//! `wallet.deposit.success`, `wallet.deposit.failed`); nothing in this
//! workspace talks to a real broker, and no example repo grounds adding one,
//! so this is an in-process substitute built on `tokio::sync::broadcast`
//! rather than a network bus. Topic names and payload shapes are kept
//! identical so a future broker-backed `EventBus` impl is a drop-in swap.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::broadcast;

/// Topic a gateway publishes reconciliation events to.
pub fn gateway_events_topic(provider_code: &str) -> String {
    format!("gateway.{provider_code}.events")
}

pub const WALLET_DEPOSIT_SUCCESS_TOPIC: &str = "wallet.deposit.success";
pub const WALLET_DEPOSIT_FAILED_TOPIC: &str = "wallet.deposit.failed";

#[derive(Debug, thiserror::Error)]
pub enum EventBusError {
    #[error("failed to encode event payload: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode event payload: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("no subscribers for topic {0}")]
    NoSubscribers(String),
}

/// Publish side of the bus. Kept as a trait so use cases depend on the
/// capability, not the in-process implementation.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish<T>(&self, topic: &str, payload: &T) -> Result<(), EventBusError>
    where
        T: Serialize + Sync;
}

/// A single consumer-group handle: cloning an `InMemoryEventBus` and calling
/// `subscribe` again yields an independent receiver, mirroring how a real
/// consumer group would get its own offset.
pub struct Subscription {
    receiver: broadcast::Receiver<String>,
}

impl Subscription {
    pub async fn recv<T: DeserializeOwned>(&mut self) -> Result<T, EventBusError> {
        let raw = self
            .receiver
            .recv()
            .await
            .map_err(|e| EventBusError::Decode(serde_json::Error::io(std::io::Error::other(e))))?;
        serde_json::from_str(&raw).map_err(EventBusError::Decode)
    }
}

/// In-process publish/subscribe bus keyed by topic name.
///
/// Each topic gets its own `broadcast` channel created lazily on first
/// publish or subscribe. Consumer groups are modeled by the caller holding
/// onto its own `Subscription` — there is no offset tracking or replay,
/// matching `broadcast`'s at-most-once-while-connected semantics.
#[derive(Clone)]
pub struct InMemoryEventBus {
    channels: std::sync::Arc<Mutex<HashMap<String, broadcast::Sender<String>>>>,
    capacity: usize,
}

impl InMemoryEventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: std::sync::Arc::new(Mutex::new(HashMap::new())),
            capacity,
        }
    }

    fn sender_for(&self, topic: &str) -> broadcast::Sender<String> {
        let mut channels = self.channels.lock().expect("event bus lock poisoned");
        channels
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Registers a named consumer group on a topic. The name only affects
    /// `tracing` output today since `broadcast` receivers are anonymous; it
    /// still documents the intended consumer-group boundary at call sites.
    pub fn subscribe(&self, topic: &str, consumer_group: &str) -> Subscription {
        tracing::debug!(topic, consumer_group, "event bus subscription registered");
        Subscription {
            receiver: self.sender_for(topic).subscribe(),
        }
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish<T>(&self, topic: &str, payload: &T) -> Result<(), EventBusError>
    where
        T: Serialize + Sync,
    {
        let encoded = serde_json::to_string(payload).map_err(EventBusError::Encode)?;
        let sender = self.sender_for(topic);
        // A publish with zero live subscribers isn't an error: the bus is
        // fire-and-forget, the same way the original Kafka producer doesn't
        // block on consumer presence.
        let _ = sender.send(encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Ping {
        n: u32,
    }

    #[tokio::test]
    async fn delivers_published_event_to_subscriber() {
        let bus = InMemoryEventBus::default();
        let mut sub = bus.subscribe(WALLET_DEPOSIT_SUCCESS_TOPIC, "reconciliation-consumer");

        bus.publish(WALLET_DEPOSIT_SUCCESS_TOPIC, &Ping { n: 7 })
            .await
            .unwrap();

        let received: Ping = sub.recv().await.unwrap();
        assert_eq!(received, Ping { n: 7 });
    }

    #[tokio::test]
    async fn independent_consumer_groups_each_get_the_event() {
        let bus = InMemoryEventBus::default();
        let mut a = bus.subscribe(WALLET_DEPOSIT_FAILED_TOPIC, "group-a");
        let mut b = bus.subscribe(WALLET_DEPOSIT_FAILED_TOPIC, "group-b");

        bus.publish(WALLET_DEPOSIT_FAILED_TOPIC, &Ping { n: 1 })
            .await
            .unwrap();

        let ra: Ping = a.recv().await.unwrap();
        let rb: Ping = b.recv().await.unwrap();
        assert_eq!(ra, Ping { n: 1 });
        assert_eq!(rb, Ping { n: 1 });
    }
}
