//! WebSocket Connection Hub
//!
//! Tracks open connections and the table topics each one follows. A
//! published event goes two ways: onto a tokio broadcast channel for
//! in-process listeners (live dashboard snapshots) and to every socket
//! subscribed to the event's topic or to `tables.*`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, RwLock};
use uuid::Uuid;

use super::messages::{ServerMessage, WsEvent};
use crate::store::Table;

/// Unique identifier for a WebSocket connection
pub type ConnectionId = String;

/// Configuration for the connection hub
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Capacity of the broadcast channel
    pub broadcast_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
            broadcast_capacity: 1024,
        }
    }
}

/// One connected dashboard
struct Peer {
    outbox: mpsc::UnboundedSender<ServerMessage>,
    topics: HashSet<String>,
}

/// Connections and the topic index, kept under one lock so they never disagree
#[derive(Default)]
struct Registry {
    peers: HashMap<ConnectionId, Peer>,
    followers: HashMap<String, HashSet<ConnectionId>>,
}

impl Registry {
    fn follow(&mut self, id: &str, topic: &str) -> bool {
        let Some(peer) = self.peers.get_mut(id) else {
            return false;
        };
        peer.topics.insert(topic.to_string());
        self.followers
            .entry(topic.to_string())
            .or_default()
            .insert(id.to_string());
        true
    }

    fn unfollow(&mut self, id: &str, topic: &str) {
        if let Some(ids) = self.followers.get_mut(topic) {
            ids.remove(id);
            if ids.is_empty() {
                self.followers.remove(topic);
            }
        }
    }

    /// Connections following `topic` directly or through its `<prefix>.*` wildcard
    fn recipients(&self, topic: &str) -> HashSet<&ConnectionId> {
        let wildcard = topic.split_once('.').map(|(prefix, _)| format!("{}.*", prefix));
        [Some(topic.to_string()), wildcard]
            .into_iter()
            .flatten()
            .filter_map(|t| self.followers.get(&t))
            .flatten()
            .collect()
    }
}

/// Manages all WebSocket connections and subscriptions
pub struct ConnectionHub {
    registry: Arc<RwLock<Registry>>,
    events: broadcast::Sender<WsEvent>,
    config: HubConfig,
}

impl ConnectionHub {
    pub fn new(config: HubConfig) -> Self {
        let (events, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            registry: Arc::new(RwLock::new(Registry::default())),
            events,
            config,
        }
    }

    /// Register a connection; fails once `max_connections` are open
    pub async fn register(
        &self,
        outbox: mpsc::UnboundedSender<ServerMessage>,
    ) -> Result<ConnectionId, HubError> {
        let mut registry = self.registry.write().await;
        if registry.peers.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        registry.peers.insert(
            id.clone(),
            Peer {
                outbox,
                topics: HashSet::new(),
            },
        );

        tracing::info!(connection_id = %id, open = registry.peers.len(), "Dashboard connected");
        Ok(id)
    }

    /// Drop a connection along with its subscriptions
    pub async fn unregister(&self, id: &str) {
        let mut registry = self.registry.write().await;
        if let Some(peer) = registry.peers.remove(id) {
            for topic in &peer.topics {
                registry.unfollow(id, topic);
            }
            tracing::info!(connection_id = %id, "Dashboard disconnected");
        }
    }

    /// Follow the valid topics among `topics`; returns the ones accepted
    pub async fn subscribe(&self, id: &str, topics: Vec<String>) -> Result<Vec<String>, HubError> {
        let mut registry = self.registry.write().await;
        if !registry.peers.contains_key(id) {
            return Err(HubError::ConnectionNotFound);
        }

        let (accepted, rejected): (Vec<String>, Vec<String>) =
            topics.into_iter().partition(|t| is_valid_topic(t));
        if !rejected.is_empty() {
            tracing::warn!(connection_id = %id, topics = ?rejected, "Ignoring unknown topics");
        }
        for topic in &accepted {
            registry.follow(id, topic);
        }

        tracing::debug!(connection_id = %id, topics = ?accepted, "Subscribed");
        Ok(accepted)
    }

    /// Stop following `topics`; returns the ones that were followed
    pub async fn unsubscribe(&self, id: &str, topics: Vec<String>) -> Result<Vec<String>, HubError> {
        let mut registry = self.registry.write().await;
        let peer = registry.peers.get_mut(id).ok_or(HubError::ConnectionNotFound)?;

        let dropped: Vec<String> = topics
            .into_iter()
            .filter(|topic| peer.topics.remove(topic))
            .collect();
        for topic in &dropped {
            registry.unfollow(id, topic);
        }

        tracing::debug!(connection_id = %id, topics = ?dropped, "Unsubscribed");
        Ok(dropped)
    }

    /// Deliver an event to its topic's followers; returns how many got it
    pub async fn broadcast(&self, event: &WsEvent) -> usize {
        deliver(&self.registry, event).await
    }

    /// Announce an event to in-process listeners and socket followers.
    ///
    /// Socket delivery runs on a spawned task, so this needs a tokio runtime.
    pub fn publish(&self, event: WsEvent) {
        // nobody listening in-process is fine
        let _ = self.events.send(event.clone());

        let registry = Arc::clone(&self.registry);
        tokio::spawn(async move {
            deliver(&registry, &event).await;
        });
    }

    /// Send a message to one connection
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let registry = self.registry.read().await;
        let peer = registry.peers.get(id).ok_or(HubError::ConnectionNotFound)?;
        peer.outbox.send(message).map_err(|_| HubError::SendFailed)
    }

    /// Receiver for every published event
    pub fn subscribe_broadcast(&self) -> broadcast::Receiver<WsEvent> {
        self.events.subscribe()
    }

    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.peers.len()
    }

    pub async fn subscription_count(&self, topic: &str) -> usize {
        self.registry
            .read()
            .await
            .followers
            .get(topic)
            .map_or(0, HashSet::len)
    }
}

/// Valid topics: `tables.*`, `tables.<known table>`, `system`
fn is_valid_topic(topic: &str) -> bool {
    match topic.strip_prefix("tables.") {
        Some("*") => true,
        Some(name) => name.parse::<Table>().is_ok(),
        None => topic == "system",
    }
}

async fn deliver(registry: &RwLock<Registry>, event: &WsEvent) -> usize {
    let registry = registry.read().await;
    let delivered = registry
        .recipients(&event.topic)
        .into_iter()
        .filter_map(|id| registry.peers.get(id))
        .filter(|peer| peer.outbox.send(event.message.clone()).is_ok())
        .count();

    if delivered > 0 {
        tracing::trace!(topic = %event.topic, delivered, "Delivered change notification");
    }
    delivered
}

/// Errors that can occur in the connection hub
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::websocket::ChangeKind;

    #[test]
    fn test_default_config() {
        let config = HubConfig::default();
        assert_eq!(config.max_connections, 1000);
        assert_eq!(config.broadcast_capacity, 1024);
    }

    #[test]
    fn test_valid_topics() {
        assert!(is_valid_topic("tables.leads"));
        assert!(is_valid_topic("tables.*"));
        assert!(is_valid_topic("tables.ab_experiments"));
        assert!(is_valid_topic("system"));

        assert!(!is_valid_topic("tables.users"));
        assert!(!is_valid_topic("invalid"));
        assert!(!is_valid_topic(""));
    }

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx).await.unwrap();
        assert!(!id.is_empty());
        assert_eq!(hub.connection_count().await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);
    }

    #[tokio::test]
    async fn test_subscribe_unsubscribe() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();

        let subscribed = hub
            .subscribe(&id, vec!["tables.leads".to_string(), "bogus".to_string()])
            .await
            .unwrap();
        assert_eq!(subscribed, vec!["tables.leads"]);
        assert_eq!(hub.subscription_count("tables.leads").await, 1);

        let unsubscribed = hub
            .unsubscribe(&id, vec!["tables.leads".to_string()])
            .await
            .unwrap();
        assert_eq!(unsubscribed, vec!["tables.leads"]);
        assert_eq!(hub.subscription_count("tables.leads").await, 0);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let hub = ConnectionHub::new(HubConfig {
            max_connections: 2,
            broadcast_capacity: 16,
        });

        let (tx1, _) = mpsc::unbounded_channel();
        let (tx2, _) = mpsc::unbounded_channel();
        let (tx3, _) = mpsc::unbounded_channel();

        hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();
        let result = hub.register(tx3).await;

        assert!(matches!(result, Err(HubError::TooManyConnections(2))));
    }

    #[tokio::test]
    async fn test_broadcast_to_subscribers() {
        let hub = ConnectionHub::new(HubConfig::default());

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let id1 = hub.register(tx1).await.unwrap();
        hub.register(tx2).await.unwrap();

        hub.subscribe(&id1, vec!["tables.leads".to_string()])
            .await
            .unwrap();

        let event = WsEvent::row_changed(Table::Leads, "42", ChangeKind::Insert);
        assert_eq!(hub.broadcast(&event).await, 1);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_wildcard_subscription() {
        let hub = ConnectionHub::new(HubConfig::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = hub.register(tx).await.unwrap();

        hub.subscribe(&id, vec!["tables.*".to_string()]).await.unwrap();

        let event = WsEvent::row_changed(Table::Forms, "1", ChangeKind::Delete);
        hub.broadcast(&event).await;

        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_publish_reaches_in_process_listeners() {
        let hub = ConnectionHub::new(HubConfig::default());
        let mut rx = hub.subscribe_broadcast();

        hub.publish(WsEvent::row_changed(Table::Leads, "7", ChangeKind::Insert));

        let event = rx.recv().await.unwrap();
        assert!(event.is_insert_into(Table::Leads));
    }
}
