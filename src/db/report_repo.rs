// src/db/report_repo.rs

use sqlx::MySqlPool;

use crate::{
    common::error::AppError,
    models::report::{HomeworkStatus, Report},
};

// Campos do relatório agrupados num struct próprio para o upsert não virar
// uma assinatura de dez argumentos.
#[derive(Debug, Clone)]
pub struct ReportInput {
    pub teacher_rating: i32,
    pub quiz_score: Option<i32>,
    pub participation: i32,
    pub behavior: Option<String>,
    pub homework: HomeworkStatus,
    pub comments: Option<String>,
    pub strengths: Option<String>,
    pub improvements: Option<String>,
}

#[derive(Clone)]
pub struct ReportRepository {
    pool: MySqlPool,
}

impl ReportRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    // Mesmo upsert da presença: a dupla (student_id, session_id) é única.
    pub async fn record(
        &self,
        student_id: i64,
        session_id: i64,
        input: &ReportInput,
    ) -> Result<Report, AppError> {
        sqlx::query(
            "INSERT INTO reports (student_id, session_id, teacher_rating, quiz_score,
                                  participation, behavior, homework, comments,
                                  strengths, improvements)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON DUPLICATE KEY UPDATE
                 teacher_rating = VALUES(teacher_rating),
                 quiz_score = VALUES(quiz_score),
                 participation = VALUES(participation),
                 behavior = VALUES(behavior),
                 homework = VALUES(homework),
                 comments = VALUES(comments),
                 strengths = VALUES(strengths),
                 improvements = VALUES(improvements)",
        )
        .bind(student_id)
        .bind(session_id)
        .bind(input.teacher_rating)
        .bind(input.quiz_score)
        .bind(input.participation)
        .bind(input.behavior.as_deref())
        .bind(input.homework)
        .bind(input.comments.as_deref())
        .bind(input.strengths.as_deref())
        .bind(input.improvements.as_deref())
        .execute(&self.pool)
        .await?;

        self.find(student_id, session_id)
            .await?
            .ok_or(AppError::NotFound("Relatório"))
    }

    pub async fn find(
        &self,
        student_id: i64,
        session_id: i64,
    ) -> Result<Option<Report>, AppError> {
        let row = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE student_id = ? AND session_id = ?",
        )
        .bind(student_id)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_for_session(&self, session_id: i64) -> Result<Vec<Report>, AppError> {
        let rows = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE session_id = ? ORDER BY student_id",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_student(&self, student_id: i64) -> Result<Vec<Report>, AppError> {
        let rows = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE student_id = ? ORDER BY created_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
