//! HTTP and WebSocket surface of the classroom attendance tracker.

pub mod auth;
pub mod response;
pub mod routes;
pub mod state;
pub mod ws;

use axum::{
    Router,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    middleware::from_fn,
};
use tower_http::cors::CorsLayer;

use crate::auth::middleware::log_request;
use crate::routes::routes;
use crate::state::AppState;
use crate::ws::ws_routes;

/// The full application: `/api/...` HTTP routes and `/ws/...` live channels.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()`; request logging
/// and device fingerprinting read the peer address.
pub fn app(app_state: AppState) -> Router {
    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_DISPOSITION, CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes())
        .nest("/ws", ws_routes())
        .layer(from_fn(log_request))
        .layer(cors)
        .with_state(app_state)
}
