// src/models/attendance.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    // Atrasado e dispensado contam como comparecimento na hora de decidir
    // qual mensagem o responsável recebe.
    pub fn counts_as_attended(self) -> bool {
        !matches!(self, AttendanceStatus::Absent)
    }
}

// Uma linha de presença. A dupla (student_id, session_id) é única: gravar de
// novo atualiza status e horário em vez de duplicar (upsert).
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i64,
    pub student_id: i64,
    pub session_id: i64,
    pub status: AttendanceStatus,
    pub recorded_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn so_ausencia_nao_conta_como_comparecimento() {
        assert!(!AttendanceStatus::Absent.counts_as_attended());
        for status in
            [AttendanceStatus::Present, AttendanceStatus::Late, AttendanceStatus::Excused]
        {
            assert!(status.counts_as_attended());
        }
        // O roster carrega Option<AttendanceStatus>; o método por valor
        // encaixa direto no map.
        let attended = Some(AttendanceStatus::Absent).map(AttendanceStatus::counts_as_attended);
        assert_eq!(attended, Some(false));
    }
}
