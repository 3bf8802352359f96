//! `/tutor` routes. Every handler runs behind `allow_tutor`, and the service checks that
//! the tutor actually teaches the class or subject involved.

pub mod get;
pub mod post;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn tutor_routes() -> Router<AppState> {
    Router::new()
        .route("/subjects", get(get::subjects))
        .route("/history", get(get::history))
        .route("/classes/{class}/lesson", get(get::lesson))
        .route("/classes/{class}/lesson/start", post(post::start_lesson))
        .route("/classes/{class}/lesson/stop", post(post::stop_lesson))
        .route("/classes/{class}/tokens", post(post::issue_tokens))
        .route("/classes/{class}/summary", get(get::summary))
        .route("/classes/{class}/summary/export", get(get::export_summary))
        .route(
            "/classes/{class}/trainees/{username}/present",
            post(post::mark_present),
        )
        .route(
            "/classes/{class}/trainees/{username}/absent",
            post(post::mark_absent),
        )
}
