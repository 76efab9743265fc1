// src/handlers/whatsapp.rs
//
// A superfície HTTP do gateway: ciclo de vida da conexão, envio do relatório
// da aula, mensagem avulsa e trilha de auditoria.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::{error::AppError, response::ApiResponse},
    config::AppState,
    middleware::rbac::{
        PermWhatsappManage, PermWhatsappSend, PermWhatsappView, RequirePermission,
    },
    models::whatsapp::{ConnectionStatusResponse, SessionReportSummary, WhatsappLog},
    whatsapp::InitOutcome,
};

// POST /api/whatsapp/initialize
//
// Bloqueia até conectar, falhar ou estourar o timeout. Chamadas concorrentes
// recebem AlreadyInitializing sem abrir um segundo handle.
#[utoipa::path(
    post,
    path = "/api/whatsapp/initialize",
    tag = "WhatsApp",
    responses(
        (status = 200, description = "Conexão estabelecida ou já em andamento"),
        (status = 502, description = "Falha ao conectar após as tentativas configuradas"),
        (status = 504, description = "Timeout aguardando a conexão")
    ),
    security(("api_jwt" = []))
)]
pub async fn initialize(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermWhatsappManage>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let outcome = app_state.whatsapp.initialize().await?;

    let message = match outcome {
        InitOutcome::Connected => "WhatsApp conectado com sucesso.",
        InitOutcome::AlreadyConnected => "WhatsApp já estava conectado.",
        InitOutcome::AlreadyInitializing => "Inicialização já em andamento.",
    };
    Ok(Json(ApiResponse::message(message)))
}

// GET /api/whatsapp/status
#[utoipa::path(
    get,
    path = "/api/whatsapp/status",
    tag = "WhatsApp",
    responses(
        (status = 200, description = "Snapshot do estado da conexão", body = ConnectionStatusResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn status(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermWhatsappView>,
) -> Json<ApiResponse<ConnectionStatusResponse>> {
    Json(ApiResponse::data(app_state.whatsapp.status().await))
}

// GET /api/whatsapp/pairing-code
pub async fn pairing_code(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermWhatsappView>,
) -> Result<Json<ApiResponse<String>>, AppError> {
    let code = app_state
        .whatsapp
        .pairing_code()
        .await
        .ok_or(AppError::NotFound("Código de pareamento"))?;
    Ok(Json(ApiResponse::data(code)))
}

// POST /api/whatsapp/disconnect
pub async fn disconnect(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermWhatsappManage>,
) -> Json<ApiResponse<()>> {
    app_state.whatsapp.disconnect().await;
    Json(ApiResponse::message("WhatsApp desconectado."))
}

// POST /api/whatsapp/send-session-report/{id}
//
// Dispara as mensagens da aula para os responsáveis, uma a uma, e devolve o
// placar (enviadas, falhas, pulados).
#[utoipa::path(
    post,
    path = "/api/whatsapp/send-session-report/{id}",
    tag = "WhatsApp",
    params(("id" = i64, Path, description = "ID da aula")),
    responses(
        (status = 200, description = "Placar do envio", body = SessionReportSummary),
        (status = 404, description = "Aula não encontrada"),
        (status = 503, description = "WhatsApp não conectado")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_session_report(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermWhatsappSend>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<SessionReportSummary>>, AppError> {
    let summary = app_state.notification_service.send_session_report(id).await?;
    Ok(Json(ApiResponse::data(summary)))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualMessagePayload {
    // Quando ausente, usa o telefone do responsável do aluno informado
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "A mensagem não pode ser vazia."))]
    pub message: String,
    // Opcional: vincula a linha de auditoria a um aluno
    pub student_id: Option<i64>,
}

// POST /api/whatsapp/send
pub async fn send_manual_message(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermWhatsappSend>,
    Json(payload): Json<ManualMessagePayload>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let student = match payload.student_id {
        Some(id) => Some(
            app_state
                .student_repo
                .find_by_id(id)
                .await?
                .filter(|s| s.is_active)
                .ok_or(AppError::NotFound("Aluno"))?,
        ),
        None => None,
    };

    let phone = payload
        .phone
        .or_else(|| student.as_ref().and_then(|s| s.parent_phone.clone()))
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Informe um telefone de destino.".into()))?;

    app_state
        .notification_service
        .send_manual_message(student.map(|s| s.id), &phone, &payload.message)
        .await?;

    Ok(Json(ApiResponse::message("Mensagem enviada com sucesso.")))
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct LogsQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

// GET /api/whatsapp/logs?page=1&perPage=50
pub async fn list_logs(
    State(app_state): State<AppState>,
    _perm: RequirePermission<PermWhatsappView>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<ApiResponse<Vec<WhatsappLog>>>, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

    let logs = app_state.whatsapp_log_repo.list_paged(page, per_page).await?;
    Ok(Json(ApiResponse::data(logs)))
}
