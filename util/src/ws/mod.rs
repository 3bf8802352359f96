//! Topic-based WebSocket plumbing shared by the HTTP server.
//!
//! Topics are plain strings (`trainee:{username}`, `class:{label}`). Everything sent over a
//! topic is a JSON [`EventEnvelope`].

pub mod axum_adapter;
pub mod handler_trait;
pub mod manager;
pub mod runtime;
pub mod serve;

pub use manager::WebSocketManager;

use chrono::Utc;
use serde::Serialize;

/// Standard event envelope sent over WebSocket topics.
#[derive(Serialize)]
pub struct EventEnvelope<'a, T> {
    #[serde(rename = "type")]
    pub r#type: &'static str,
    pub event: &'a str,
    pub topic: &'a str,
    pub payload: T,
    pub ts: String,
}

/// Wraps `payload` in an [`EventEnvelope`] and broadcasts it on `topic`.
///
/// Returns how many live subscribers the frame was handed to. Zero is not an error:
/// nobody listening simply means the update is dropped.
pub async fn emit<T: Serialize>(
    ws: &WebSocketManager,
    topic: &str,
    event: &str,
    payload: &T,
) -> usize {
    let env = EventEnvelope {
        r#type: "event",
        event,
        topic,
        payload,
        ts: Utc::now().to_rfc3339(),
    };
    match serde_json::to_string(&env) {
        Ok(json) => ws.broadcast(topic, json).await,
        Err(e) => {
            tracing::warn!(topic, event, error = %e, "Failed to serialize WS envelope");
            0
        }
    }
}
