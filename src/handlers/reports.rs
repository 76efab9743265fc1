// src/handlers/reports.rs

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    db::report_repo::ReportInput,
    middleware::rbac::{PermReportsEdit, PermReportsView, RequirePermission},
    models::report::{HomeworkStatus, Report},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordReportPayload {
    pub student_id: i64,
    pub session_id: i64,

    #[validate(range(min = 1, max = 5, message = "A avaliação vai de 1 a 5."))]
    pub teacher_rating: i32,

    #[validate(range(min = 0, max = 100, message = "A nota do quiz vai de 0 a 100."))]
    pub quiz_score: Option<i32>,

    #[validate(range(min = 1, max = 5, message = "A participação vai de 1 a 5."))]
    pub participation: i32,

    pub behavior: Option<String>,
    pub homework: HomeworkStatus,
    pub comments: Option<String>,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
}

// Mesmo upsert da presença: um relatório por aluno por aula
pub async fn record_report(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsEdit>,
    Json(payload): Json<RecordReportPayload>,
) -> Result<Json<ApiResponse<Report>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state
        .student_repo
        .find_by_id(payload.student_id)
        .await?
        .filter(|s| s.is_active)
        .ok_or(AppError::NotFound("Aluno"))?;
    app_state
        .session_repo
        .find_by_id(payload.session_id)
        .await?
        .ok_or(AppError::NotFound("Aula"))?;

    let input = ReportInput {
        teacher_rating: payload.teacher_rating,
        quiz_score: payload.quiz_score,
        participation: payload.participation,
        behavior: payload.behavior,
        homework: payload.homework,
        comments: payload.comments,
        strengths: payload.strengths,
        improvements: payload.improvements,
    };

    let report =
        app_state.report_repo.record(payload.student_id, payload.session_id, &input).await?;

    Ok(Json(ApiResponse::data(report)))
}

pub async fn list_session_reports(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsView>,
    Path(session_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Report>>>, AppError> {
    let rows = app_state.report_repo.list_for_session(session_id).await?;
    Ok(Json(ApiResponse::data(rows)))
}

pub async fn list_student_reports(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermReportsView>,
    Path(student_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Report>>>, AppError> {
    let rows = app_state.report_repo.list_for_student(student_id).await?;
    Ok(Json(ApiResponse::data(rows)))
}
