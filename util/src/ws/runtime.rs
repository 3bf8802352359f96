use super::EventEnvelope;
use axum::extract::ws::{Message, Utf8Bytes};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;

/// Per-connection handle given to a [`WsHandler`](super::handler_trait::WsHandler).
pub struct WsContext {
    pub topic: String,
    out_tx: mpsc::Sender<Message>,
}

impl WsContext {
    pub fn new(topic: String, out_tx: mpsc::Sender<Message>) -> Self {
        Self { topic, out_tx }
    }

    /// Queues a text frame for this client only.
    pub async fn reply_text(&self, text: impl Into<Utf8Bytes>) -> Result<(), ()> {
        self.out_tx
            .send(Message::Text(text.into()))
            .await
            .map_err(|_| ())
    }

    /// Queues an enveloped event for this client only, stamped with this socket's topic.
    pub async fn reply_event<T: Serialize>(&self, event: &str, payload: &T) -> Result<(), ()> {
        let env = EventEnvelope {
            r#type: "event",
            event,
            topic: &self.topic,
            payload,
            ts: Utc::now().to_rfc3339(),
        };
        match serde_json::to_string(&env) {
            Ok(json) => self.reply_text(json).await,
            Err(e) => {
                tracing::warn!(topic = %self.topic, event, error = %e, "Failed to serialize WS reply");
                Err(())
            }
        }
    }

    pub async fn reply_pong(&self, payload: bytes::Bytes) -> Result<(), ()> {
        self.out_tx
            .send(Message::Pong(payload))
            .await
            .map_err(|_| ())
    }
}
