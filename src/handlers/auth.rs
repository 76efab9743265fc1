// src/handlers/auth.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AuthResponse, LoginPayload, User},
};

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Login efetuado, token no envelope", body = AuthResponse),
        (status = 401, description = "Usuário ou senha inválidos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<ApiResponse<AuthResponse>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let (token, user) = app_state.auth_service.login(&payload.username, &payload.password).await?;

    Ok(Json(ApiResponse::data(AuthResponse { token, user })))
}

// Handler da rota protegida /me
pub async fn get_me(
    AuthenticatedUser(user): AuthenticatedUser,
) -> Json<ApiResponse<User>> {
    Json(ApiResponse::data(user))
}
