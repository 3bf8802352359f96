use axum::{
    Extension, Json,
    extract::{Path, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::account::Role;
use std::sync::Arc;
use util::ws::axum_adapter::ws_route;
use util::ws::serve::WsServerOptions;

use super::topics::{class_topic, trainee_topic};
use super::ws_handlers::{ClassWsHandler, TraineeWsHandler};
use crate::auth::AuthUser;
use crate::response::{ApiResponse, Empty};
use crate::state::AppState;

fn forbidden(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::<Empty>::error(message)),
    )
        .into_response()
}

/// GET /ws/trainees/{username}
///
/// Private channel of one trainee; only that trainee may subscribe.
pub async fn trainee_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(username): Path<String>,
) -> Response {
    if user.role() != Role::Trainee || user.username() != username {
        return forbidden("You can only follow your own channel");
    }

    let handler = Arc::new(TraineeWsHandler {
        attendance: app_state.attendance().clone(),
        trainee: username.clone(),
    });

    ws_route(
        ws,
        app_state.ws_clone(),
        trainee_topic(&username),
        Some(username),
        handler,
        WsServerOptions::default(),
    )
    .into_response()
}

/// GET /ws/classes/{class}
///
/// Shared class channel for the class's trainees and the tutors who teach it.
pub async fn class_ws_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class): Path<String>,
) -> Response {
    if !app_state
        .attendance()
        .can_follow_class(user.username(), &class)
        .await
    {
        return forbidden("You are not part of this class");
    }

    let handler = Arc::new(ClassWsHandler {
        attendance: app_state.attendance().clone(),
        class: class.clone(),
    });

    ws_route(
        ws,
        app_state.ws_clone(),
        class_topic(&class),
        Some(user.username().to_string()),
        handler,
        WsServerOptions::default(),
    )
    .into_response()
}
