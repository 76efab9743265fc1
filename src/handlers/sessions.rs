// src/handlers/sessions.rs

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{
        PermSessionsDelete, PermSessionsEdit, PermSessionsView, RequirePermission,
    },
    models::{
        session::{Session, SessionStatus},
        whatsapp::SessionRosterEntry,
    },
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionPayload {
    pub class_id: i64,
    pub location_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionPayload {
    pub location_id: Option<i64>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: SessionStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusPayload {
    pub status: SessionStatus,
}

pub async fn list_sessions(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSessionsView>,
) -> Result<Json<ApiResponse<Vec<Session>>>, AppError> {
    let sessions = app_state.session_repo.list().await?;
    Ok(Json(ApiResponse::data(sessions)))
}

pub async fn get_session(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSessionsView>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let session =
        app_state.session_repo.find_by_id(id).await?.ok_or(AppError::NotFound("Aula"))?;
    Ok(Json(ApiResponse::data(session)))
}

pub async fn create_session(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSessionsEdit>,
    Json(payload): Json<CreateSessionPayload>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    if payload.ends_at <= payload.starts_at {
        return Err(AppError::BadRequest(
            "O horário de término deve ser depois do início.".into(),
        ));
    }

    // A turma precisa existir e estar ativa
    app_state
        .class_repo
        .find_by_id(payload.class_id)
        .await?
        .filter(|c| c.is_active)
        .ok_or(AppError::NotFound("Turma"))?;

    let session = app_state
        .session_repo
        .create(
            payload.class_id,
            payload.location_id,
            payload.starts_at,
            payload.ends_at,
            payload.notes.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::data(session)))
}

pub async fn update_session(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSessionsEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateSessionPayload>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    if payload.ends_at <= payload.starts_at {
        return Err(AppError::BadRequest(
            "O horário de término deve ser depois do início.".into(),
        ));
    }

    let session = app_state
        .session_repo
        .update(
            id,
            payload.location_id,
            payload.starts_at,
            payload.ends_at,
            payload.status,
            payload.notes.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::data(session)))
}

// Atalho usado pela tela de chamada para abrir/encerrar a aula
pub async fn update_session_status(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSessionsEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusPayload>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let session = app_state.session_repo.update_status(id, payload.status).await?;
    Ok(Json(ApiResponse::data(session)))
}

pub async fn delete_session(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSessionsDelete>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    app_state.session_repo.soft_delete(id).await?;
    Ok(Json(ApiResponse::message("Aula removida com sucesso.")))
}

// O roster vivo da aula: a lista de alunos vem da composição ATUAL da turma,
// com presença e relatório daquela aula quando já registrados
pub async fn get_session_roster(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermSessionsView>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<SessionRosterEntry>>>, AppError> {
    let session =
        app_state.session_repo.find_by_id(id).await?.ok_or(AppError::NotFound("Aula"))?;
    let roster = app_state.session_repo.roster(session.id, session.class_id).await?;
    Ok(Json(ApiResponse::data(roster)))
}
