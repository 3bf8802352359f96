use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use services::{ActiveLesson, AttendanceStatus, IssuedToken};
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::{ApiResponse, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct StartLessonRequest {
    #[validate(length(min = 1, message = "Subject is required"))]
    pub subject: String,

    /// Defaults to the configured lesson length.
    #[validate(range(min = 1, max = 600, message = "Duration must be between 1 and 600 minutes"))]
    pub duration_minutes: Option<i64>,
}

/// POST /tutor/classes/{class}/lesson/start
///
/// Starts a lesson for the class, overwriting whatever was running.
///
/// ### Request Body
/// ```json
/// { "subject": "Mathematics", "duration_minutes": 60 }
/// ```
pub async fn start_lesson(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class): Path<String>,
    Json(req): Json<StartLessonRequest>,
) -> Result<Json<ApiResponse<ActiveLesson>>, AppError> {
    req.validate()?;

    let lesson = state
        .attendance()
        .start_lesson(
            user.username(),
            &class,
            &req.subject,
            req.duration_minutes.map(Duration::minutes),
        )
        .await?;
    Ok(Json(ApiResponse::success(lesson, "Lesson started successfully")))
}

/// POST /tutor/classes/{class}/lesson/stop
///
/// `data` is the lesson that was running, or `null`.
pub async fn stop_lesson(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class): Path<String>,
) -> Result<Json<ApiResponse<Option<ActiveLesson>>>, AppError> {
    let stopped = state.attendance().stop_lesson(user.username(), &class).await?;
    Ok(Json(ApiResponse::success(stopped, "Lesson stopped")))
}

/// POST /tutor/classes/{class}/tokens
///
/// Issues a fresh token to every trainee of the class. Requires an active lesson the
/// tutor teaches. Each token is also pushed to the trainee's private channel.
pub async fn issue_tokens(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class): Path<String>,
) -> Result<Json<ApiResponse<Vec<IssuedToken>>>, AppError> {
    let tokens = state.attendance().issue_tokens(user.username(), &class).await?;
    Ok(Json(ApiResponse::success(tokens, "Tokens generated")))
}

#[derive(Debug, Serialize, Default)]
pub struct MarkResponse {
    pub username: String,
    pub status: String,
    pub percentage: u8,
}

async fn mark(
    state: &AppState,
    user: &AuthUser,
    class: &str,
    username: String,
    status: AttendanceStatus,
) -> Result<Json<ApiResponse<MarkResponse>>, AppError> {
    let percentage = state
        .attendance()
        .tutor_mark(user.username(), class, &username, status)
        .await?;
    Ok(Json(ApiResponse::success(
        MarkResponse {
            username,
            status: status.to_string(),
            percentage,
        },
        format!("Marked {status}"),
    )))
}

/// POST /tutor/classes/{class}/trainees/{username}/present
///
/// ### Responses
/// - `200 OK` with the trainee's new subject percentage
/// - `409 Conflict` if no lesson is active or the trainee is already marked for it
/// - `404 Not Found` if the trainee is not in the class
pub async fn mark_present(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((class, username)): Path<(String, String)>,
) -> Result<Json<ApiResponse<MarkResponse>>, AppError> {
    mark(&state, &user, &class, username, AttendanceStatus::Present).await
}

/// POST /tutor/classes/{class}/trainees/{username}/absent
pub async fn mark_absent(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path((class, username)): Path<(String, String)>,
) -> Result<Json<ApiResponse<MarkResponse>>, AppError> {
    mark(&state, &user, &class, username, AttendanceStatus::Absent).await
}
