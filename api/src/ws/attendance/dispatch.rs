use services::LiveUpdate;
use tokio::{sync::mpsc::UnboundedReceiver, task::JoinHandle};
use util::ws::WebSocketManager;

use super::emit::deliver;

/// Forwards every update published on the live-update bus to its WebSocket topic.
///
/// Runs until every bus handle is dropped. Nobody listening on a topic is normal and
/// only logged at debug level.
pub fn spawn_live_update_dispatcher(
    ws: WebSocketManager,
    mut rx: UnboundedReceiver<LiveUpdate>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            let channel = update.channel();
            let delivered = deliver(&ws, update).await;
            tracing::debug!(?channel, delivered, "Live update dispatched");
        }
        tracing::info!("Live update bus closed");
    })
}
