// src/db/whatsapp_log_repo.rs

use sqlx::MySqlPool;

use crate::{
    common::error::AppError,
    models::whatsapp::{DeliveryStatus, MessageType, WhatsappLog},
};

// Trilha de auditoria de mensagens: só escreve e lista, nunca altera.
#[derive(Clone)]
pub struct WhatsappLogRepository {
    pool: MySqlPool,
}

impl WhatsappLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        student_id: Option<i64>,
        session_id: Option<i64>,
        message_type: MessageType,
        delivery_status: DeliveryStatus,
        message_body: &str,
        recipient_phone: &str,
        error_message: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO whatsapp_logs (student_id, session_id, message_type, delivery_status,
                                        message_body, recipient_phone, error_message)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(student_id)
        .bind(session_id)
        .bind(message_type)
        .bind(delivery_status)
        .bind(message_body)
        .bind(recipient_phone)
        .bind(error_message)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // Página de logs, do mais recente para o mais antigo
    pub async fn list_paged(&self, page: u32, per_page: u32) -> Result<Vec<WhatsappLog>, AppError> {
        let offset = page_offset(page, per_page);
        let rows = sqlx::query_as::<_, WhatsappLog>(
            "SELECT * FROM whatsapp_logs ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        )
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

// Em u64 para não estourar com uma página absurda vinda do cliente
fn page_offset(page: u32, per_page: u32) -> u64 {
    u64::from(page.saturating_sub(1)) * u64::from(per_page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_da_pagina_nao_estoura() {
        assert_eq!(page_offset(1, 50), 0);
        assert_eq!(page_offset(3, 50), 100);
        // page * per_page acima de u32::MAX continua bem definido
        assert_eq!(
            page_offset(u32::MAX, 200),
            u64::from(u32::MAX - 1) * 200
        );
    }
}
