// src/common/response.rs

use serde::Serialize;
use utoipa::ToSchema;

// O envelope padrão da API, consumido pelo frontend:
// sucesso -> { "success": true, "data": ... }
// leitura de lista -> { "success": true, "data": [...] }
// mensagem informativa -> { "success": true, "message": "..." }
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self { success: true, data: Some(data), message: None }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self { success: true, data: None, message: Some(message.into()) }
    }

    pub fn data_with_message(data: T, message: impl Into<String>) -> Self {
        Self { success: true, data: Some(data), message: Some(message.into()) }
    }
}
