// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{PermDashboardView, RequirePermission},
    models::dashboard::DashboardStats,
};

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores agregados do painel", body = DashboardStats),
        (status = 401, description = "Não autorizado"),
        (status = 403, description = "Sem a permissão dashboard:view")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermDashboardView>,
) -> Result<Json<ApiResponse<DashboardStats>>, AppError> {
    let stats = app_state.dashboard_repo.stats().await?;
    Ok(Json(ApiResponse::data(stats)))
}
