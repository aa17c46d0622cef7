//! WebSocket Message Types
//!
//! Defines all message types for WebSocket communication between
//! back-office dashboards and the server.

use serde::{Deserialize, Serialize};

use crate::store::Table;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Subscribe to topics for change notifications
    Subscribe {
        /// List of topics to subscribe to (e.g., "tables.leads", "tables.*")
        topics: Vec<String>,
    },
    /// Unsubscribe from topics
    Unsubscribe {
        /// List of topics to unsubscribe from
        topics: Vec<String>,
    },
    /// Ping for keepalive
    Ping,
}

/// Kind of row mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A row was written; subscribers re-query the table
    RowChanged {
        table: Table,
        id: String,
        change: ChangeKind,
    },
    /// Subscription confirmed
    Subscribed {
        /// Topics successfully subscribed to
        topics: Vec<String>,
    },
    /// Unsubscription confirmed
    Unsubscribed {
        /// Topics successfully unsubscribed from
        topics: Vec<String>,
    },
    /// Pong response to ping
    Pong,
    /// Server notice (maintenance, shutdown)
    Notice { message: String },
    /// Error message
    Error {
        /// Error description
        message: String,
    },
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
}

/// Internal event for broadcasting through the hub
#[derive(Debug, Clone)]
pub struct WsEvent {
    /// Topic this event belongs to (e.g., "tables.leads")
    pub topic: String,
    /// The message to send to subscribers
    pub message: ServerMessage,
}

impl WsEvent {
    pub fn row_changed(table: Table, id: impl Into<String>, change: ChangeKind) -> Self {
        Self {
            topic: format!("tables.{}", table.as_str()),
            message: ServerMessage::RowChanged {
                table,
                id: id.into(),
                change,
            },
        }
    }

    pub fn system(message: &str) -> Self {
        Self {
            topic: "system".to_string(),
            message: ServerMessage::Notice {
                message: message.to_string(),
            },
        }
    }

    /// Is this an insert into `table`
    pub fn is_insert_into(&self, table: Table) -> bool {
        matches!(
            self.message,
            ServerMessage::RowChanged { table: t, change: ChangeKind::Insert, .. } if t == table
        )
    }
}
