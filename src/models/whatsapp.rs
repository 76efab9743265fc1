// src/models/whatsapp.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::attendance::AttendanceStatus;
use super::report::HomeworkStatus;

// Tipo de mensagem enviada ao responsável.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum MessageType {
    Absence,
    Performance,
    Confirmation,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

// Linha da trilha de auditoria. Nunca é lida de volta pela lógica de negócio.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WhatsappLog {
    pub id: i64,
    // Nulo em mensagens avulsas digitadas sem vincular um aluno
    pub student_id: Option<i64>,
    pub session_id: Option<i64>,
    pub message_type: MessageType,
    pub delivery_status: DeliveryStatus,
    pub message_body: String,
    pub recipient_phone: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Uma linha do roster da aula: aluno ativo da turma com o LEFT JOIN de
// presença e relatório daquela aula. Alimenta a tela de chamada e o
// planejamento de envio.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRosterEntry {
    pub student_id: i64,
    pub student_name: String,
    pub parent_phone: Option<String>,

    pub attendance_status: Option<AttendanceStatus>,

    pub report_id: Option<i64>,
    pub teacher_rating: Option<i32>,
    pub quiz_score: Option<i32>,
    pub participation: Option<i32>,
    pub behavior: Option<String>,
    pub homework: Option<HomeworkStatus>,
    pub comments: Option<String>,
}

impl SessionRosterEntry {
    pub fn has_report(&self) -> bool {
        self.report_id.is_some()
    }
}

// Resultado agregado do envio do relatório da aula.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionReportSummary {
    pub sent: u32,
    pub failed: u32,
    pub total: u32,
    // Alunos pulados por não terem telefone utilizável
    pub skipped: u32,
}

// Snapshot do estado do gateway exposto em GET /api/whatsapp/status.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatusResponse {
    #[schema(example = "connected")]
    pub state: String,
    pub connected: bool,
    pub retry_count: u32,
    pub last_activity: Option<DateTime<Utc>>,
    pub pairing_code_available: bool,
}
