//! Push channel management.
//!
//! Long-lived server-to-client connections, independent of the
//! request/response transport. The connection registry is the one
//! piece of mutable shared state in the gateway; every touch goes
//! through the manager's lock. Keep-alive timers are per-connection
//! and cancelled in the same critical section that removes the entry,
//! so no timer outlives its connection.

use crate::frame::SseFrame;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

/// Default keep-alive interval between `:ping` frames.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Metadata for one live push connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConnection {
    /// Unique connection id.
    pub id: String,

    /// When the connection was opened.
    pub opened_at: DateTime<Utc>,
}

/// Registry entry: metadata plus the transport sink and keep-alive task.
struct ConnectionEntry {
    meta: PushConnection,
    sender: mpsc::UnboundedSender<SseFrame>,
    keepalive: JoinHandle<()>,
}

/// Manager for long-lived push connections.
///
/// Supports concurrent opens, closes, sends, and broadcasts; frames to
/// connections that have already gone away are dropped silently since
/// disconnect races are expected.
pub struct PushChannelManager {
    /// Live connections.
    connections: Arc<RwLock<HashMap<String, ConnectionEntry>>>,

    /// Interval between keep-alive frames.
    keepalive_interval: Duration,
}

impl PushChannelManager {
    /// Create a manager with the default keep-alive interval.
    pub fn new() -> Self {
        Self::with_keepalive_interval(DEFAULT_KEEPALIVE_INTERVAL)
    }

    /// Create a manager with a custom keep-alive interval.
    pub fn with_keepalive_interval(keepalive_interval: Duration) -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            keepalive_interval,
        }
    }

    /// Register a connection.
    ///
    /// Assigns a unique id, emits the initial `open` event carrying it,
    /// and schedules keep-alive frames for the connection's lifetime.
    /// Returns the assigned id.
    pub async fn open(&self, sender: mpsc::UnboundedSender<SseFrame>) -> String {
        let id = uuid::Uuid::now_v7().to_string();
        let meta = PushConnection {
            id: id.clone(),
            opened_at: Utc::now(),
        };

        let open_frame = SseFrame::event(
            "open",
            serde_json::json!({"type": "connection", "id": id}),
        );
        let _ = sender.send(open_frame);

        let keepalive = self.spawn_keepalive(sender.clone());

        let mut connections = self.connections.write().await;
        connections.insert(
            id.clone(),
            ConnectionEntry {
                meta,
                sender,
                keepalive,
            },
        );
        debug!("push connection {id} opened ({} live)", connections.len());

        id
    }

    /// Deregister a connection.
    ///
    /// Runs on every disconnect path, graceful or not: the keep-alive
    /// task is cancelled in the same critical section that removes the
    /// entry. Unknown ids are a no-op.
    pub async fn close(&self, id: &str) {
        let mut connections = self.connections.write().await;
        if let Some(entry) = connections.remove(id) {
            entry.keepalive.abort();
            debug!("push connection {id} closed ({} live)", connections.len());
        }
    }

    /// Send a message to one connection.
    ///
    /// A no-op when the id is unknown: the connection already went
    /// away, which is not an error.
    pub async fn send(&self, id: &str, message: serde_json::Value) {
        let connections = self.connections.read().await;
        if let Some(entry) = connections.get(id) {
            let _ = entry.sender.send(SseFrame::data(message));
        }
    }

    /// Broadcast a message to every live connection.
    ///
    /// Iterates the registry snapshot at call time; connections closing
    /// mid-broadcast simply miss the frame.
    pub async fn broadcast(&self, message: serde_json::Value) {
        let connections = self.connections.read().await;
        for entry in connections.values() {
            let _ = entry.sender.send(SseFrame::data(message.clone()));
        }
    }

    /// Metadata for one connection, if it is still live.
    pub async fn describe(&self, id: &str) -> Option<PushConnection> {
        let connections = self.connections.read().await;
        connections.get(id).map(|entry| entry.meta.clone())
    }

    /// Number of live connections.
    pub async fn len(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Whether no connections are live.
    pub async fn is_empty(&self) -> bool {
        self.connections.read().await.is_empty()
    }

    /// Spawn the per-connection keep-alive task.
    ///
    /// The first tick fires one full interval after open; the task ends
    /// on abort or when the receiving side is gone.
    fn spawn_keepalive(&self, sender: mpsc::UnboundedSender<SseFrame>) -> JoinHandle<()> {
        let interval = self.keepalive_interval;
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                ticker.tick().await;
                if sender.send(SseFrame::keepalive()).is_err() {
                    break;
                }
            }
        })
    }
}

impl Default for PushChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
