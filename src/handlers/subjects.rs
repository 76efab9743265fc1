// src/handlers/subjects.rs

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
        PermSubjectsDelete, PermSubjectsEdit, PermSubjectsView, RequirePermission,
    },
    models::school::Subject,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectPayload {
    #[validate(length(min = 1, message = "O nome da disciplina é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
}

pub async fn list_subjects(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSubjectsView>,
) -> Result<Json<ApiResponse<Vec<Subject>>>, AppError> {
    let subjects = app_state.subject_repo.list().await?;
    Ok(Json(ApiResponse::data(subjects)))
}

pub async fn create_subject(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSubjectsEdit>,
    Json(payload): Json<SubjectPayload>,
) -> Result<Json<ApiResponse<Subject>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let subject =
        app_state.subject_repo.create(&payload.name, payload.description.as_deref()).await?;
    Ok(Json(ApiResponse::data(subject)))
}

pub async fn update_subject(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSubjectsEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<SubjectPayload>,
) -> Result<Json<ApiResponse<Subject>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let subject =
        app_state.subject_repo.update(id, &payload.name, payload.description.as_deref()).await?;
    Ok(Json(ApiResponse::data(subject)))
}

pub async fn delete_subject(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSubjectsDelete>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    app_state.subject_repo.soft_delete(id).await?;
    Ok(Json(ApiResponse::message("Disciplina removida com sucesso.")))
}
