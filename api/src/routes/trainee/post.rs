use axum::{
    Extension, Json,
    extract::{ConnectInfo, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};
use services::DeviceFingerprint;
use std::net::SocketAddr;
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::{ApiResponse, AppError, Empty};
use crate::routes::common::client_metadata;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitTokenRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

/// POST /trainee/token
///
/// Checks the entered token and consumes it. A token works once.
///
/// ### Responses
/// - `200 OK` on a match
/// - `400 Bad Request` when no token is live, it expired, or the value is wrong
pub async fn submit_token(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<SubmitTokenRequest>,
) -> Result<Json<ApiResponse<Empty>>, AppError> {
    req.validate()?;
    state
        .attendance()
        .submit_token(user.username(), &req.token)
        .await?;
    Ok(Json(ApiResponse::success(Empty, "Token accepted")))
}

#[derive(Debug, Serialize, Default)]
pub struct AttendanceResponse {
    pub percentage: u8,
    pub device: String,
}

/// POST /trainee/attendance
///
/// One-tap present mark for the class's active lesson. The device fingerprint is
/// derived from `User-Agent`, `Accept-Language` and the peer address; each device marks
/// at most one trainee per lesson.
///
/// ### Responses
/// - `200 OK` with the new subject percentage
/// - `409 Conflict` when no lesson is active, the trainee is already marked, or the
///   device was already used for this lesson
pub async fn mark_attendance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<AttendanceResponse>>, AppError> {
    let device = DeviceFingerprint::compute(&client_metadata(&headers, addr));
    let percentage = state
        .attendance()
        .mark_self_present(user.username(), device)
        .await?;
    Ok(Json(ApiResponse::success(
        AttendanceResponse {
            percentage,
            device: device.to_hex(),
        },
        "Attendance marked successfully",
    )))
}
