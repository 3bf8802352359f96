use axum::{Extension, Json, extract::State};
use serde::Serialize;
use services::{ActiveLesson, TraineeOverview};

use crate::auth::AuthUser;
use crate::response::{ApiResponse, AppError};
use crate::state::AppState;

/// GET /trainee/me
///
/// Class, assessment number, per-subject percentages and the class's active lesson.
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<TraineeOverview>>, AppError> {
    let overview = state.attendance().trainee_overview(user.username()).await?;
    Ok(Json(ApiResponse::success(overview, "Overview retrieved")))
}

#[derive(Debug, Serialize, Default)]
pub struct LatestToken {
    pub token: Option<String>,
    pub expires_at: Option<String>,
}

/// GET /trainee/token
///
/// The live token, for pages that poll instead of listening on the WebSocket.
/// `token` is `null` when none was issued or it expired.
pub async fn latest_token(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<LatestToken>>, AppError> {
    let token = state.attendance().latest_token(user.username()).await?;
    let (message, body) = match token {
        Some(t) => (
            "Token available",
            LatestToken {
                token: Some(t.value),
                expires_at: Some(t.expires_at.to_rfc3339()),
            },
        ),
        None => (
            "Your tutor has not generated a token yet",
            LatestToken::default(),
        ),
    };
    Ok(Json(ApiResponse::success(body, message)))
}

/// GET /trainee/lesson
///
/// ### Responses
/// - `200 OK` with tutor, subject and end time
/// - `409 Conflict` when the class has no active lesson
pub async fn active_lesson(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<ActiveLesson>>, AppError> {
    let lesson = state.attendance().active_lesson_for(user.username()).await?;
    Ok(Json(ApiResponse::success(lesson, "Active lesson retrieved")))
}
