//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → health check (public)
//! - `/auth` → registration and login (public)
//! - `/tutor` → lessons, tokens, marks, summaries, history (tutors only)
//! - `/trainee` → overview, token entry, one-tap attendance (trainees only)

use crate::auth::guards::{allow_trainee, allow_tutor};
use crate::routes::{
    auth::auth_routes, health::health_routes, trainee::trainee_routes, tutor::tutor_routes,
};
use crate::state::AppState;
use axum::{Router, middleware::from_fn};

pub mod auth;
pub mod common;
pub mod health;
pub mod trainee;
pub mod tutor;

/// Builds the router for every HTTP endpoint under `/api`. State is supplied by [`crate::app`].
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/tutor", tutor_routes().route_layer(from_fn(allow_tutor)))
        .nest("/trainee", trainee_routes().route_layer(from_fn(allow_trainee)))
}
