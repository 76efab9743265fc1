// src/handlers/attendance.rs

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
    middleware::rbac::{PermAttendanceEdit, PermAttendanceView, RequirePermission},
    models::attendance::{Attendance, AttendanceStatus},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordAttendancePayload {
    pub student_id: i64,
    pub session_id: i64,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

// Upsert: registrar de novo para o mesmo aluno e aula atualiza em vez de duplicar
pub async fn record_attendance(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermAttendanceEdit>,
    Json(payload): Json<RecordAttendancePayload>,
) -> Result<Json<ApiResponse<Attendance>>, AppError> {
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

    let attendance = app_state
        .attendance_repo
        .record(payload.student_id, payload.session_id, payload.status, payload.notes.as_deref())
        .await?;

    Ok(Json(ApiResponse::data(attendance)))
}

pub async fn list_session_attendance(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermAttendanceView>,
    Path(session_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Attendance>>>, AppError> {
    let rows = app_state.attendance_repo.list_for_session(session_id).await?;
    Ok(Json(ApiResponse::data(rows)))
}

pub async fn list_student_attendance(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermAttendanceView>,
    Path(student_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Attendance>>>, AppError> {
    let rows = app_state.attendance_repo.list_for_student(student_id).await?;
    Ok(Json(ApiResponse::data(rows)))
}
