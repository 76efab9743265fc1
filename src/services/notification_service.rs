// src/services/notification_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{ClassRepository, SessionRepository, WhatsappLogRepository},
    models::whatsapp::{DeliveryStatus, MessageType, SessionReportSummary},
    whatsapp::{templates, WhatsappGateway},
};

// Orquestra o envio do relatório de uma aula: monta o plano a partir do
// roster, despacha mensagem a mensagem pelo gateway e grava cada resultado
// na trilha de auditoria.
#[derive(Clone)]
pub struct NotificationService {
    session_repo: SessionRepository,
    class_repo: ClassRepository,
    log_repo: WhatsappLogRepository,
    gateway: Arc<WhatsappGateway>,
}

impl NotificationService {
    pub fn new(
        session_repo: SessionRepository,
        class_repo: ClassRepository,
        log_repo: WhatsappLogRepository,
        gateway: Arc<WhatsappGateway>,
    ) -> Self {
        Self { session_repo, class_repo, log_repo, gateway }
    }

    pub async fn send_session_report(
        &self,
        session_id: i64,
    ) -> Result<SessionReportSummary, AppError> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await?
            .ok_or(AppError::NotFound("Aula"))?;
        let class = self
            .class_repo
            .find_by_id(session.class_id)
            .await?
            .ok_or(AppError::NotFound("Turma"))?;

        let roster = self.session_repo.roster(session.id, class.id).await?;
        let plan = templates::plan_session_messages(&class.name, session.starts_at, &roster);

        tracing::info!(
            "🚀 Enviando relatório da aula {} ({}): {} mensagem(ns), {} aluno(s) sem telefone",
            session.id,
            class.name,
            plan.messages.len(),
            plan.skipped,
        );

        let mut summary = SessionReportSummary {
            sent: 0,
            failed: 0,
            total: plan.messages.len() as u32,
            skipped: plan.skipped,
        };

        // Envio sequencial: o gateway já impõe o intervalo entre mensagens
        for message in &plan.messages {
            match self.gateway.send_message(&message.phone, &message.body).await {
                Ok(recipient) => {
                    summary.sent += 1;
                    self.log_repo
                        .insert(
                            Some(message.student_id),
                            Some(session.id),
                            message.kind,
                            DeliveryStatus::Sent,
                            &message.body,
                            &recipient,
                            None,
                        )
                        .await?;
                }
                Err(err) => {
                    summary.failed += 1;
                    tracing::warn!(
                        "🔥 Falha ao enviar para o responsável de '{}': {}",
                        message.student_name,
                        err
                    );
                    self.log_repo
                        .insert(
                            Some(message.student_id),
                            Some(session.id),
                            message.kind,
                            DeliveryStatus::Failed,
                            &message.body,
                            &message.phone,
                            Some(&err.to_string()),
                        )
                        .await?;
                }
            }
        }

        tracing::info!(
            "✅ Relatório da aula {} concluído: {}/{} enviadas, {} falha(s)",
            session.id,
            summary.sent,
            summary.total,
            summary.failed,
        );

        Ok(summary)
    }

    // Mensagem avulsa, fora do fluxo da aula. O aluno é opcional: serve só
    // para vincular a linha de auditoria.
    pub async fn send_manual_message(
        &self,
        student_id: Option<i64>,
        phone: &str,
        body: &str,
    ) -> Result<(), AppError> {
        match self.gateway.send_message(phone, body).await {
            Ok(recipient) => {
                self.log_repo
                    .insert(
                        student_id,
                        None,
                        MessageType::Manual,
                        DeliveryStatus::Sent,
                        body,
                        &recipient,
                        None,
                    )
                    .await?;
                Ok(())
            }
            Err(err) => {
                self.log_repo
                    .insert(
                        student_id,
                        None,
                        MessageType::Manual,
                        DeliveryStatus::Failed,
                        body,
                        phone,
                        Some(&err.to_string()),
                    )
                    .await?;
                Err(err.into())
            }
        }
    }
}
