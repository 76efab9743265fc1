// src/handlers/users.rs
//
// Gestão de usuários do painel: restrita a quem tem 'users:manage'
// (na prática, admins).

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
    middleware::rbac::{default_permissions, PermUsersManage, RequirePermission, ALL_PERMISSIONS},
    models::auth::{Role, User},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, message = "O usuário deve ter no mínimo 3 caracteres."))]
    pub username: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(min = 1, message = "O nome de exibição é obrigatório."))]
    pub display_name: String,
    pub role: Role,
    // Quando ausente, o conjunto padrão do papel é aplicado
    pub permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 1, message = "O nome de exibição é obrigatório."))]
    pub display_name: String,
    pub role: Role,
    pub permissions: Vec<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
}

pub async fn list_users(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermUsersManage>,
) -> Result<Json<ApiResponse<Vec<User>>>, AppError> {
    let users = app_state.user_repo.list().await?;
    Ok(Json(ApiResponse::data(users)))
}

pub async fn create_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermUsersManage>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let password_hash = app_state.auth_service.hash_password(&payload.password).await?;
    let permissions =
        payload.permissions.unwrap_or_else(|| default_permissions(payload.role));

    let user = app_state
        .user_repo
        .create(&payload.username, &password_hash, &payload.display_name, payload.role, &permissions)
        .await?;

    Ok(Json(ApiResponse::data(user)))
}

pub async fn update_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermUsersManage>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<Json<ApiResponse<User>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let password_hash = match payload.password.as_deref() {
        Some(password) => Some(app_state.auth_service.hash_password(password).await?),
        None => None,
    };

    let user = app_state
        .user_repo
        .update(
            id,
            &payload.display_name,
            payload.role,
            &payload.permissions,
            password_hash.as_deref(),
        )
        .await?;

    Ok(Json(ApiResponse::data(user)))
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermUsersManage>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    app_state.user_repo.soft_delete(id).await?;
    Ok(Json(ApiResponse::message("Usuário removido com sucesso.")))
}

// O catálogo completo de permissões, para montar a tela de edição
pub async fn list_permissions(
    _perm: RequirePermission<PermUsersManage>,
) -> Json<ApiResponse<Vec<&'static str>>> {
    Json(ApiResponse::data(ALL_PERMISSIONS.to_vec()))
}
