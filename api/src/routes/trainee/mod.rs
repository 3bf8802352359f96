//! `/trainee` routes, all behind `allow_trainee`. A trainee only ever acts on their own
//! account, so no path carries a username.

pub mod get;
pub mod post;

use axum::{Router, routing::get};

use crate::state::AppState;

pub fn trainee_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get::me))
        .route("/token", get(get::latest_token).post(post::submit_token))
        .route("/lesson", get(get::active_lesson))
        .route("/attendance", axum::routing::post(post::mark_attendance))
}
