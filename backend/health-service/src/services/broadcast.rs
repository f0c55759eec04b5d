// Feed hub: real-time fan-out of community events to connected clients.
//
// Events are ephemeral. A listener only sees what is broadcast while it is
// connected; there is no replay.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::models::PostResponse;

/// Connection ID type for uniquely identifying listener connections
pub type ConnectionId = Uuid;

/// Envelope pushed to every connected listener
#[derive(Debug, Clone, Serialize)]
pub struct FeedEvent {
    /// Event type identifier
    #[serde(rename = "type")]
    pub event_type: String,
    /// Event payload as JSON
    pub payload: serde_json::Value,
    /// Timestamp when the event was created
    pub timestamp: DateTime<Utc>,
}

impl FeedEvent {
    pub fn post_created(post: &PostResponse) -> Self {
        FeedEvent {
            event_type: "post_created".to_string(),
            payload: serde_json::to_value(post).unwrap_or(serde_json::Value::Null),
            timestamp: Utc::now(),
        }
    }
}

/// Capability handed to write paths that need to announce an event without
/// knowing anything about the transport behind it.
pub trait EventPublisher: Send + Sync {
    /// Fire-and-forget delivery to currently connected listeners. Must
    /// never block or fail the caller.
    fn publish(&self, event: FeedEvent);
}

/// Central registry of connected feed listeners
#[derive(Default)]
pub struct FeedHub {
    /// All active connections indexed by connection ID
    connections: RwLock<HashMap<ConnectionId, UnboundedSender<FeedEvent>>>,
}

impl FeedHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total number of active connections
    pub fn connection_count(&self) -> usize {
        self.read_connections().len()
    }

    /// Register a new listener. Returns the connection ID and the channel
    /// the listener drains.
    pub fn subscribe(&self) -> (ConnectionId, UnboundedReceiver<FeedEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = Uuid::new_v4();

        self.write_connections().insert(connection_id, tx);
        (connection_id, rx)
    }

    /// Remove a listener when it disconnects
    pub fn unsubscribe(&self, connection_id: ConnectionId) -> bool {
        self.write_connections().remove(&connection_id).is_some()
    }

    /// Send an event to every connected listener. A listener whose channel
    /// is gone is skipped; it never blocks or fails the broadcast.
    pub fn broadcast(&self, event: FeedEvent) -> usize {
        let connections = self.read_connections();
        let mut delivered = 0;

        for sender in connections.values() {
            if sender.send(event.clone()).is_ok() {
                delivered += 1;
            }
        }

        delivered
    }

    fn read_connections(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, HashMap<ConnectionId, UnboundedSender<FeedEvent>>> {
        self.connections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_connections(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, HashMap<ConnectionId, UnboundedSender<FeedEvent>>> {
        self.connections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl EventPublisher for FeedHub {
    fn publish(&self, event: FeedEvent) {
        let delivered = self.broadcast(event);
        tracing::debug!(delivered, "published feed event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_response() -> PostResponse {
        PostResponse {
            id: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4().to_string(),
            content: "hello".to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_hub_starts_empty() {
        let hub = FeedHub::new();
        assert_eq!(hub.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_and_unsubscribe() {
        let hub = FeedHub::new();
        let (connection_id, _rx) = hub.subscribe();
        assert_eq!(hub.connection_count(), 1);

        assert!(hub.unsubscribe(connection_id));
        assert_eq!(hub.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_connection() {
        let hub = FeedHub::new();
        assert!(!hub.unsubscribe(Uuid::new_v4()));
    }

    #[tokio::test]
    async fn test_connection_ids_are_unique() {
        let hub = FeedHub::new();
        let (id1, _rx1) = hub.subscribe();
        let (id2, _rx2) = hub.subscribe();

        assert_ne!(id1, id2);
        assert_eq!(hub.connection_count(), 2);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_listeners() {
        let hub = FeedHub::new();
        let (_id1, mut rx1) = hub.subscribe();
        let (_id2, mut rx2) = hub.subscribe();

        let delivered = hub.broadcast(FeedEvent::post_created(&post_response()));
        assert_eq!(delivered, 2);

        assert_eq!(rx1.recv().await.unwrap().event_type, "post_created");
        assert_eq!(rx2.recv().await.unwrap().event_type, "post_created");
    }

    #[tokio::test]
    async fn test_broadcast_skips_dropped_listener() {
        let hub = FeedHub::new();
        let (_id1, mut rx1) = hub.subscribe();
        let (_id2, rx2) = hub.subscribe();
        drop(rx2);

        // The dead channel must not fail the broadcast
        let delivered = hub.broadcast(FeedEvent::post_created(&post_response()));
        assert_eq!(delivered, 1);
        assert!(rx1.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_unsubscribed_listener_receives_nothing() {
        let hub = FeedHub::new();
        let (id, mut rx) = hub.subscribe();
        hub.unsubscribe(id);

        let delivered = hub.broadcast(FeedEvent::post_created(&post_response()));
        assert_eq!(delivered, 0);
        // Sender was dropped on unsubscribe, so the channel is closed
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_publish_is_fire_and_forget() {
        let hub = FeedHub::new();
        // No listeners at all: publish must simply do nothing
        hub.publish(FeedEvent::post_created(&post_response()));
        assert_eq!(hub.connection_count(), 0);
    }

    #[test]
    fn test_event_serialization() {
        let post = post_response();
        let event = FeedEvent::post_created(&post);

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"post_created\""));
        assert!(json.contains(&post.id));
        assert!(json.contains("\"payload\""));
    }
}
