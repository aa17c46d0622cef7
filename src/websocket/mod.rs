//! WebSocket Change Notifications
//!
//! Dashboards connect to `/ws` and subscribe to table topics. Every insert,
//! update or delete made through a repository is announced; subscribers
//! re-query the table. There is no ordering or delivery guarantee beyond
//! "eventually re-query".
//!
//! Topics:
//! - `tables.*` - every table
//! - `tables.{name}` - one table (e.g., `tables.contact_submissions`)
//! - `system` - server notices
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8090/ws');
//! ws.onopen = () => ws.send(JSON.stringify({type: 'subscribe', topics: ['tables.leads']}));
//! ws.onmessage = (event) => refetchLeads();
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, HubConfig, HubError};
pub use messages::{ChangeKind, ClientMessage, ServerMessage, WsEvent};
