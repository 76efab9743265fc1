// src/handlers/locations.rs

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
        PermLocationsDelete, PermLocationsEdit, PermLocationsView, RequirePermission,
    },
    models::school::Location,
};

fn default_capacity() -> i32 {
    30
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LocationPayload {
    #[validate(length(min = 1, message = "O nome da sala é obrigatório."))]
    pub name: String,
    pub room_number: Option<String>,
    #[serde(default = "default_capacity")]
    #[validate(range(min = 1, message = "A capacidade deve ser positiva."))]
    pub capacity: i32,
    pub description: Option<String>,
}

pub async fn list_locations(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermLocationsView>,
) -> Result<Json<ApiResponse<Vec<Location>>>, AppError> {
    let locations = app_state.location_repo.list().await?;
    Ok(Json(ApiResponse::data(locations)))
}

pub async fn create_location(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermLocationsEdit>,
    Json(payload): Json<LocationPayload>,
) -> Result<Json<ApiResponse<Location>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let location = app_state
        .location_repo
        .create(
            &payload.name,
            payload.room_number.as_deref(),
            payload.capacity,
            payload.description.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::data(location)))
}

pub async fn update_location(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermLocationsEdit>,
    Path(id): Path<i64>,
    Json(payload): Json<LocationPayload>,
) -> Result<Json<ApiResponse<Location>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let location = app_state
        .location_repo
        .update(
            id,
            &payload.name,
            payload.room_number.as_deref(),
            payload.capacity,
            payload.description.as_deref(),
        )
        .await?;
    Ok(Json(ApiResponse::data(location)))
}

pub async fn delete_location(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermLocationsDelete>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    app_state.location_repo.soft_delete(id).await?;
    Ok(Json(ApiResponse::message("Sala removida com sucesso.")))
}
