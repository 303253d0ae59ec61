//! SSE frame encoding.
//!
//! The push channel speaks Server-Sent Events: named event frames,
//! bare data frames, and comment frames for keep-alives. Rendering
//! here is wire-exact; transports write the frames verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single frame on the push channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SseFrame {
    /// Event frame, optionally named.
    Event {
        /// Event type; omitted for bare data frames.
        event: Option<String>,
        /// JSON payload.
        data: serde_json::Value,
    },

    /// Comment frame; ignored by clients, keeps the connection warm.
    Comment(String),
}

impl SseFrame {
    /// Create a named event frame.
    pub fn event(event: impl Into<String>, data: serde_json::Value) -> Self {
        SseFrame::Event {
            event: Some(event.into()),
            data,
        }
    }

    /// Create a bare data frame.
    pub fn data(data: serde_json::Value) -> Self {
        SseFrame::Event { event: None, data }
    }

    /// The keep-alive comment frame.
    pub fn keepalive() -> Self {
        SseFrame::Comment("ping".to_string())
    }
}

impl fmt::Display for SseFrame {
    /// Render the frame in SSE wire format.
    ///
    /// `event: <type>\ndata: <json>\n\n` for named events,
    /// `data: <json>\n\n` for bare data, `:<text>\n\n` for comments.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SseFrame::Event {
                event: Some(event),
                data,
            } => write!(f, "event: {event}\ndata: {data}\n\n"),
            SseFrame::Event { event: None, data } => write!(f, "data: {data}\n\n"),
            SseFrame::Comment(text) => write!(f, ":{text}\n\n"),
        }
    }
}
