//! `/auth` routes: account registration and login.

pub mod post;

use axum::{Router, routing::post};

use crate::state::AppState;
use post::{login, register};

/// - `POST /auth/register` → `register`
/// - `POST /auth/login` → `login`
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
