// src/handlers/classes.rs

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
    middleware::rbac::{PermClassesDelete, PermClassesEdit, PermClassesView, RequirePermission},
    models::school::Class,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassPayload {
    #[validate(length(min = 1, message = "O nome da turma é obrigatório."))]
    pub name: String,
    pub teacher_id: Option<i64>,
    #[validate(range(min = 1, message = "A capacidade deve ser positiva."))]
    pub max_capacity: i32,
}

pub async fn list_classes(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermClassesView>,
) -> Result<Json<ApiResponse<Vec<Class>>>, AppError> {
    let classes = app_state.class_repo.list().await?;
    Ok(Json(ApiResponse::data(classes)))
}

pub async fn create_class(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermClassesEdit>,
    Json(payload): Json<ClassPayload>,
) -> Result<Json<ApiResponse<Class>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let class = app_state
        .class_repo
        .create(&payload.name, payload.teacher_id, payload.max_capacity)
        .await?;
    Ok(Json(ApiResponse::data(class)))
}

pub async fn update_class(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermClassesEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<ClassPayload>,
) -> Result<Json<ApiResponse<Class>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let class = app_state
        .class_repo
        .update(id, &payload.name, payload.teacher_id, payload.max_capacity)
        .await?;
    Ok(Json(ApiResponse::data(class)))
}

// Remoção bloqueada com alunos matriculados; aulas no histórico só geram aviso
pub async fn delete_class(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermClassesDelete>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let warning = app_state.class_repo.soft_delete(id).await?;
    let message = warning.unwrap_or_else(|| "Turma removida com sucesso.".to_string());
    Ok(Json(ApiResponse::message(message)))
}
