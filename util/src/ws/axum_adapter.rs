use super::WebSocketManager;
use super::handler_trait::WsHandler;
use super::serve::{WsServerOptions, serve_topic};
use axum::{
    extract::{WebSocketUpgrade, ws::WebSocket},
    response::IntoResponse,
};
use std::sync::Arc;

/// Upgrades the request and hands the socket to [`serve_topic`] on `topic`.
pub fn ws_route<H>(
    ws: WebSocketUpgrade,
    manager: WebSocketManager,
    topic: String,
    username: Option<String>,
    handler: Arc<H>,
    opts: WsServerOptions,
) -> impl IntoResponse
where
    H: WsHandler,
{
    ws.on_upgrade(move |socket: WebSocket| async move {
        serve_topic(socket, manager, topic, username, handler, opts).await;
    })
}
