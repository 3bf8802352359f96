use axum::{Json, extract::State, http::StatusCode};
use db::models::account::{AccountKind, Model as Account, NewAccount, Role, SubjectClasses};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::generate_jwt;
use crate::response::{ApiResponse, AppError};
use crate::state::AppState;

static USERNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.\-]{3,32}$").expect("valid username regex"));

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(regex(
        path = *USERNAME_REGEX,
        message = "Username must be 3-32 letters, digits, '.', '_' or '-'"
    ))]
    pub username: String,

    #[validate(length(min = 1, max = 100, message = "Full name is required"))]
    pub full_name: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    pub role: Role,

    /// Trainees only.
    #[serde(default)]
    pub class: String,

    /// Trainees only.
    #[serde(default)]
    pub assessment_number: String,

    /// Tutors only: subject → classes taught.
    #[serde(default)]
    pub subjects: SubjectClasses,
}

impl From<RegisterRequest> for NewAccount {
    fn from(req: RegisterRequest) -> Self {
        let kind = match req.role {
            Role::Trainee => AccountKind::Trainee {
                class: req.class.trim().to_string(),
                assessment_number: req.assessment_number.trim().to_string(),
            },
            Role::Tutor => AccountKind::Tutor {
                subjects: req.subjects,
            },
        };
        NewAccount {
            username: req.username,
            full_name: req.full_name.trim().to_string(),
            password: req.password,
            kind,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct AccountResponse {
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub class: String,
    pub assessment_number: String,
    pub subjects: SubjectClasses,
    pub token: String,
    pub expires_at: String,
}

impl AccountResponse {
    fn issue(account: Account) -> Result<Self, AppError> {
        let (token, expires_at) = generate_jwt(&account.username, account.role)
            .map_err(|e| AppError::Internal(format!("Token encoding failed: {e}")))?;
        Ok(Self {
            subjects: account.subject_map(),
            role: account.role.to_string(),
            username: account.username,
            full_name: account.full_name,
            class: account.class,
            assessment_number: account.assessment_number,
            token,
            expires_at,
        })
    }
}

/// POST /auth/register
///
/// Creates a trainee or tutor account and logs it in.
///
/// ### Request Body
/// ```json
/// { "username": "alice", "full_name": "Alice Smith", "password": "secret1",
///   "role": "trainee", "class": "10A", "assessment_number": "A-001" }
/// ```
/// Tutors send `"role": "tutor"` and `"subjects": { "Mathematics": ["10A", "10B"] }` instead.
///
/// ### Responses
/// - `201 Created` with the account and a JWT
/// - `400 Bad Request` (validation failure, trainee without class)
/// - `409 Conflict` (username taken, or trainee display name taken)
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), AppError> {
    req.validate()?;

    let account = state.attendance().register(req.into()).await?;
    let response = AccountResponse::issue(account)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(response, "Account registered successfully")),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/login
///
/// ### Responses
/// - `200 OK` with the account and a JWT
/// - `401 Unauthorized` on an unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AccountResponse>>, AppError> {
    let account = state
        .attendance()
        .authenticate(&req.username, &req.password)
        .await?;
    tracing::info!(username = %account.username, role = %account.role, "Login");

    Ok(Json(ApiResponse::success(
        AccountResponse::issue(account)?,
        "Login successful",
    )))
}
