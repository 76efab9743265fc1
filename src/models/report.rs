// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum HomeworkStatus {
    Completed,
    Incomplete,
    Partial,
}

// Relatório de desempenho por aluno e aula, com o mesmo upsert da presença.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i64,
    pub student_id: i64,
    pub session_id: i64,

    // Avaliação do professor, 1 a 5
    pub teacher_rating: i32,

    // Nota de quiz, 0 a 100 (opcional)
    pub quiz_score: Option<i32>,

    // Participação, 1 a 5
    pub participation: i32,

    pub behavior: Option<String>,
    pub homework: HomeworkStatus,
    pub comments: Option<String>,
    pub strengths: Option<String>,
    pub improvements: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
