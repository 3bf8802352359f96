//! Thread-safe topic registry for WebSocket fan-out.
//!
//! Each topic owns a Tokio broadcast channel. Nothing is buffered for late joiners: a
//! subscriber only sees frames sent after it subscribed.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

type Topic = String;
type Sender = broadcast::Sender<String>;
type Receiver = broadcast::Receiver<String>;

/// Per-topic channel capacity. Slow readers that fall further behind lose frames.
const CHANNEL_CAPACITY: usize = 100;

/// Broadcast channels keyed by topic.
///
/// Channels are created lazily on first subscription and dropped once a broadcast
/// finds no receivers left.
#[derive(Clone, Default)]
pub struct WebSocketManager {
    inner: Arc<RwLock<HashMap<Topic, Sender>>>,
}

impl WebSocketManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `topic`, creating its channel if necessary.
    pub async fn subscribe(&self, topic: &str) -> Receiver {
        let mut map = self.inner.write().await;
        map.entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Sends `msg` to every current subscriber of `topic` and returns how many got it.
    ///
    /// Unknown topics are a no-op. A topic whose receivers are all gone is removed.
    pub async fn broadcast<T: Into<String>>(&self, topic: &str, msg: T) -> usize {
        let mut map = self.inner.write().await;
        let Some(sender) = map.get(topic) else {
            return 0;
        };
        match sender.send(msg.into()) {
            Ok(n) => n,
            Err(_) => {
                tracing::debug!("Removing topic '{topic}' due to no subscribers.");
                map.remove(topic);
                0
            }
        }
    }

    /// Returns `true` if `topic` currently has a live channel.
    pub async fn has_topic(&self, topic: &str) -> bool {
        self.inner.read().await.contains_key(topic)
    }
}
