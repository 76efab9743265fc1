// src/db/session_repo.rs

use chrono::{DateTime, Utc};
use sqlx::MySqlPool;

use crate::{
    common::error::AppError,
    models::{
        session::{Session, SessionStatus},
        whatsapp::SessionRosterEntry,
    },
};

#[derive(Clone)]
pub struct SessionRepository {
    pool: MySqlPool,
}

impl SessionRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Session>, AppError> {
        let sessions = sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE is_active = TRUE ORDER BY starts_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sessions)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Session>, AppError> {
        let session = sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(session)
    }

    pub async fn create(
        &self,
        class_id: i64,
        location_id: Option<i64>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<Session, AppError> {
        let result = sqlx::query(
            "INSERT INTO sessions (class_id, location_id, starts_at, ends_at, notes)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(class_id)
        .bind(location_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_id() as i64)
            .await?
            .ok_or(AppError::NotFound("Aula"))
    }

    pub async fn update(
        &self,
        id: i64,
        location_id: Option<i64>,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        status: SessionStatus,
        notes: Option<&str>,
    ) -> Result<Session, AppError> {
        sqlx::query(
            "UPDATE sessions SET location_id = ?, starts_at = ?, ends_at = ?, status = ?,
             notes = ? WHERE id = ?",
        )
        .bind(location_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(status)
        .bind(notes)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or(AppError::NotFound("Aula"))
    }

    pub async fn update_status(&self, id: i64, status: SessionStatus) -> Result<Session, AppError> {
        sqlx::query("UPDATE sessions SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await?.ok_or(AppError::NotFound("Aula"))
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE sessions SET is_active = FALSE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Aula"));
        }
        Ok(())
    }

    // O roster da aula: todos os alunos ativos da turma, cada um com sua
    // presença e relatório daquela aula (quando existirem). É desta consulta
    // que sai o plano de envio de mensagens.
    pub async fn roster(
        &self,
        session_id: i64,
        class_id: i64,
    ) -> Result<Vec<SessionRosterEntry>, AppError> {
        let roster = sqlx::query_as::<_, SessionRosterEntry>(
            "SELECT st.id AS student_id,
                    st.name AS student_name,
                    st.parent_phone,
                    a.status AS attendance_status,
                    r.id AS report_id,
                    r.teacher_rating,
                    r.quiz_score,
                    r.participation,
                    r.behavior,
                    r.homework,
                    r.comments
             FROM students st
             LEFT JOIN attendance a ON a.student_id = st.id AND a.session_id = ?
             LEFT JOIN reports r ON r.student_id = st.id AND r.session_id = ?
             WHERE st.class_id = ? AND st.is_active = TRUE
             ORDER BY st.name",
        )
        .bind(session_id)
        .bind(session_id)
        .bind(class_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roster)
    }
}
