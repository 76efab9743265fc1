// src/handlers/students.rs

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
        PermStudentsDelete, PermStudentsEdit, PermStudentsView, RequirePermission,
    },
    models::school::Student,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentPayload {
    #[validate(length(min = 1, message = "O nome do aluno é obrigatório."))]
    pub name: String,
    pub parent_phone: Option<String>,
    #[validate(email(message = "E-mail do responsável inválido."))]
    pub parent_email: Option<String>,
    pub class_id: Option<i64>,
}

pub async fn list_students(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermStudentsView>,
) -> Result<Json<ApiResponse<Vec<Student>>>, AppError> {
    let students = app_state.student_repo.list().await?;
    Ok(Json(ApiResponse::data(students)))
}

pub async fn get_student(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermStudentsView>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Student>>, AppError> {
    let student =
        app_state.student_repo.find_by_id(id).await?.ok_or(AppError::NotFound("Aluno"))?;
    Ok(Json(ApiResponse::data(student)))
}

// Busca pelo código de barras do crachá (fluxo da leitora na entrada)
pub async fn get_student_by_barcode(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermStudentsView>,
    Path(barcode): Path<String>,
) -> Result<Json<ApiResponse<Student>>, AppError> {
    let student = app_state
        .student_service
        .find_by_barcode(&barcode)
        .await?
        .ok_or(AppError::NotFound("Aluno"))?;
    Ok(Json(ApiResponse::data(student)))
}

// O código de barras não vem no payload: é alocado pelo serviço
pub async fn create_student(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermStudentsEdit>,
    Json(payload): Json<StudentPayload>,
) -> Result<Json<ApiResponse<Student>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let student = app_state
        .student_service
        .create_with_barcode(
            &payload.name,
            payload.parent_phone.as_deref(),
            payload.parent_email.as_deref(),
            payload.class_id,
        )
        .await?;

    Ok(Json(ApiResponse::data(student)))
}

pub async fn update_student(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermStudentsEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<StudentPayload>,
) -> Result<Json<ApiResponse<Student>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let student = app_state
        .student_repo
        .update(
            id,
            &payload.name,
            payload.parent_phone.as_deref(),
            payload.parent_email.as_deref(),
            payload.class_id,
        )
        .await?;

    Ok(Json(ApiResponse::data(student)))
}

pub async fn delete_student(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermStudentsDelete>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    app_state.student_repo.soft_delete(id).await?;
    Ok(Json(ApiResponse::message("Aluno removido com sucesso.")))
}
