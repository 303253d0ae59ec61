//! # Tollgate Push
//!
//! Server-push channel management for the Tollgate MCP gateway.
//!
//! ## Overview
//!
//! The tollgate-push crate handles:
//! - **Frames**: Wire-exact SSE rendering (named events, bare data,
//!   keep-alive comments)
//! - **Channels**: The connection registry with per-connection
//!   keep-alive timers and targeted or broadcast delivery
//!
//! ## Lifecycle
//!
//! Opening a connection assigns a unique id, pushes an `open` event
//! carrying it, and starts a 30-second keep-alive timer. Closing tears
//! down the timer and the registry entry in one step, on graceful and
//! abrupt disconnects alike. Sends to departed connections are dropped
//! silently.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tollgate_push::PushChannelManager;
//! use tokio::sync::mpsc;
//!
//! async fn stream() {
//!     let manager = PushChannelManager::new();
//!     let (tx, mut rx) = mpsc::unbounded_channel();
//!
//!     let id = manager.open(tx).await;
//!     manager.send(&id, serde_json::json!({"tick": 1})).await;
//!
//!     while let Some(frame) = rx.recv().await {
//!         print!("{frame}");
//!     }
//!     manager.close(&id).await;
//! }
//! ```

pub mod channel;
pub mod frame;

// Re-export main types
pub use channel::{PushChannelManager, PushConnection, DEFAULT_KEEPALIVE_INTERVAL};
pub use frame::SseFrame;
