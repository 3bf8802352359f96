use crate::response::ApiResponse;
use crate::state::AppState;
use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use serde::Serialize;

/// Builds the `/health` route group.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

#[derive(Serialize, Default)]
pub struct HealthStatus {
    pub status: &'static str,
    pub database: &'static str,
}

/// GET /health
///
/// Reports whether the server is up and the account database answers.
///
/// ### Responses
/// - `200 OK`
/// ```json
/// { "success": true, "data": { "status": "ok", "database": "ok" }, "message": "Health check passed" }
/// ```
/// - `503 Service Unavailable` when the database does not respond
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.db().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                HealthStatus {
                    status: "ok",
                    database: "ok",
                },
                "Health check passed",
            )),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    success: false,
                    data: HealthStatus {
                        status: "degraded",
                        database: "unreachable",
                    },
                    message: "Database unreachable".into(),
                }),
            )
        }
    }
}
