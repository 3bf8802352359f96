use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
};
use db::models::account::SubjectClasses;
use serde::Deserialize;
use services::{HistoryEntry, LessonSession, SummaryRow};

use crate::auth::AuthUser;
use crate::response::{ApiResponse, AppError};
use crate::routes::common::csv_field;
use crate::state::AppState;

/// GET /tutor/subjects
///
/// The tutor's subject → classes map.
pub async fn subjects(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<SubjectClasses>>, AppError> {
    let subjects = state.attendance().tutor_subjects(user.username()).await?;
    Ok(Json(ApiResponse::success(subjects, "Subjects retrieved")))
}

/// GET /tutor/classes/{class}/lesson
///
/// Current lesson state of the class, `{"state":"inactive"}` or
/// `{"state":"active","subject":..,"tutor":..,"started_at":..,"ends_at":..,"occurrence":..}`.
pub async fn lesson(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class): Path<String>,
) -> Result<Json<ApiResponse<LessonSession>>, AppError> {
    let session = state.attendance().lesson(user.username(), &class).await?;
    Ok(Json(ApiResponse::success(session, "Lesson retrieved")))
}

#[derive(Debug, Deserialize)]
pub struct SubjectQuery {
    pub subject: String,
}

/// GET /tutor/classes/{class}/summary?subject=Mathematics
///
/// One row per trainee of the class: name, assessment number, percentage for the
/// subject, today's date and current status. Unmarked trainees read as 0% / Absent.
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class): Path<String>,
    Query(query): Query<SubjectQuery>,
) -> Result<Json<ApiResponse<Vec<SummaryRow>>>, AppError> {
    let rows = state
        .attendance()
        .summary(user.username(), &class, &query.subject)
        .await?;
    Ok(Json(ApiResponse::success(rows, "Summary retrieved")))
}

/// GET /tutor/classes/{class}/summary/export?subject=Mathematics
///
/// The summary as a CSV download.
pub async fn export_summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(class): Path<String>,
    Query(query): Query<SubjectQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = state
        .attendance()
        .summary(user.username(), &class, &query.subject)
        .await?;

    let mut csv = String::from("Name,Assessment Number,Attendance %,Date,Status\n");
    for row in &rows {
        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            csv_field(&row.name),
            csv_field(&row.assessment_number),
            row.percentage,
            row.date,
            row.status
        ));
    }

    let filename = format!(
        "attendance_{}_{}_{}.csv",
        class.replace(['"', '/', '\\'], "_"),
        query.subject.replace(['"', '/', '\\'], "_"),
        state.attendance().today()
    );
    tracing::info!(class = %class, subject = %query.subject, rows = rows.len(), "Summary exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    ))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub subject: Option<String>,
    pub class: Option<String>,
}

/// GET /tutor/history?subject=&class=
///
/// Attendance log in the order it was recorded, filtered by exact subject and/or class.
pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<HistoryEntry>>>, AppError> {
    let entries = state
        .attendance()
        .history(
            user.username(),
            query.subject.as_deref(),
            query.class.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::success(entries, "History retrieved")))
}
