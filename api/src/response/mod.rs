use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use services::AttendanceError;
use validator::ValidationErrors;

use crate::routes::common::format_validation_errors;

/// Standardized API response wrapper for all outgoing JSON responses.
///
/// This struct enforces a consistent response structure across all endpoints:
/// ```json
/// {
///   "success": true,
///   "data": { ... },
///   "message": "Some message"
/// }
/// ```
///
/// - `T` is the type of the `data` payload.
/// - `success` is a boolean indicating operation status.
/// - `message` provides a human-readable context string.
///
/// ## Example (success):
/// ```json
/// {
///   "success": true,
///   "data": { "percentage": 5 },
///   "message": "Attendance marked successfully"
/// }
/// ```
///
/// ## Example (error):
/// ```json
/// {
///   "success": false,
///   "data": null,
///   "message": "No active lesson for class 10A"
/// }
/// ```
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Constructs a success response with the given data and message.
    ///
    /// # Arguments
    /// - `data`: The result payload.
    /// - `message`: A descriptive message to accompany the success.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: message.into(),
        }
    }

    /// Constructs an error response with a message and default `data`.
    ///
    /// # Arguments
    /// - `message`: A description of the error.
    ///
    /// # Requires
    /// - `T` must implement `Default`, since error responses do not include useful data.
    pub fn error(message: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            success: false,
            data: T::default(),
            message: message.into(),
        }
    }
}

/// Placeholder payload for responses that carry no data.
#[derive(Serialize, Default)]
pub struct Empty;

/// Error type handlers return with `?`.
pub enum AppError {
    Attendance(AttendanceError),
    /// Request body failed validation.
    Validation(String),
    Internal(String),
}

impl From<AttendanceError> for AppError {
    fn from(err: AttendanceError) -> Self {
        Self::Attendance(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(format_validation_errors(&errors))
    }
}

/// HTTP status an attendance error is reported with.
pub fn status_for(err: &AttendanceError) -> StatusCode {
    match err {
        AttendanceError::AuthorizationDenied(_) => StatusCode::FORBIDDEN,
        AttendanceError::NoActiveLesson { .. } => StatusCode::CONFLICT,
        AttendanceError::AlreadyMarked { .. } | AttendanceError::DeviceAlreadyUsed => {
            StatusCode::CONFLICT
        }
        AttendanceError::DuplicateAccount(_) => StatusCode::CONFLICT,
        AttendanceError::TokenRejected(_) | AttendanceError::InvalidAccount(_) => {
            StatusCode::BAD_REQUEST
        }
        AttendanceError::UnknownTrainee(_) => StatusCode::NOT_FOUND,
        AttendanceError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AttendanceError::Directory(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Attendance(err) => (status_for(&err), err.to_string()),
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        if status.is_server_error() {
            tracing::error!(%status, %message, "Request failed");
        }
        (status, Json(ApiResponse::<Empty>::error(message))).into_response()
    }
}
