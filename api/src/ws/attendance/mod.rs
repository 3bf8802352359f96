//! Live attendance channels: `trainee:{username}` and `class:{label}`.

use axum::{Router, routing::get};

use crate::state::AppState;

pub mod dispatch;
pub mod emit;
pub mod handlers;
pub mod payload;
pub mod topics;
pub mod ws_handlers;

use handlers::{class_ws_handler, trainee_ws_handler};

pub fn ws_attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/trainees/{username}", get(trainee_ws_handler))
        .route("/classes/{class}", get(class_ws_handler))
}
