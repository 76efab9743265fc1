// src/handlers/teachers.rs

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
    middleware::rbac::{
        PermTeachersDelete, PermTeachersEdit, PermTeachersView, RequirePermission,
    },
    models::school::Teacher,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherPayload {
    #[validate(length(min = 1, message = "O nome do professor é obrigatório."))]
    pub name: String,
    pub subject_id: Option<i64>,
    pub phone: Option<String>,
    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,
}

pub async fn list_teachers(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermTeachersView>,
) -> Result<Json<ApiResponse<Vec<Teacher>>>, AppError> {
    let teachers = app_state.teacher_repo.list().await?;
    Ok(Json(ApiResponse::data(teachers)))
}

pub async fn create_teacher(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermTeachersEdit>,
    Json(payload): Json<TeacherPayload>,
) -> Result<Json<ApiResponse<Teacher>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let teacher = app_state
        .teacher_repo
        .create(
            &payload.name,
            payload.subject_id,
            payload.phone.as_deref(),
            payload.email.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::data(teacher)))
}

pub async fn update_teacher(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermTeachersEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<TeacherPayload>,
) -> Result<Json<ApiResponse<Teacher>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let teacher = app_state
        .teacher_repo
        .update(
            id,
            &payload.name,
            payload.subject_id,
            payload.phone.as_deref(),
            payload.email.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::data(teacher)))
}

pub async fn delete_teacher(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermTeachersDelete>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    app_state.teacher_repo.soft_delete(id).await?;
    Ok(Json(ApiResponse::message("Professor removido com sucesso.")))
}
