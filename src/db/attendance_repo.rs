// src/db/attendance_repo.rs

use sqlx::MySqlPool;

use crate::{
    common::error::AppError,
    models::attendance::{Attendance, AttendanceStatus},
};

#[derive(Clone)]
pub struct AttendanceRepository {
    pool: MySqlPool,
}

impl AttendanceRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    // Upsert sobre a chave única (student_id, session_id): registrar de novo
    // atualiza o status e o horário em vez de duplicar a linha.
    pub async fn record(
        &self,
        student_id: i64,
        session_id: i64,
        status: AttendanceStatus,
        notes: Option<&str>,
    ) -> Result<Attendance, AppError> {
        sqlx::query(
            "INSERT INTO attendance (student_id, session_id, status, recorded_at, notes)
             VALUES (?, ?, ?, NOW(), ?)
             ON DUPLICATE KEY UPDATE
                 status = VALUES(status),
                 recorded_at = VALUES(recorded_at),
                 notes = VALUES(notes)",
        )
        .bind(student_id)
        .bind(session_id)
        .bind(status)
        .bind(notes)
        .execute(&self.pool)
        .await?;

        self.find(student_id, session_id)
            .await?
            .ok_or(AppError::NotFound("Presença"))
    }

    pub async fn find(
        &self,
        student_id: i64,
        session_id: i64,
    ) -> Result<Option<Attendance>, AppError> {
        let row = sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendance WHERE student_id = ? AND session_id = ?",
        )
        .bind(student_id)
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn list_for_session(&self, session_id: i64) -> Result<Vec<Attendance>, AppError> {
        let rows = sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendance WHERE session_id = ? ORDER BY recorded_at",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn list_for_student(&self, student_id: i64) -> Result<Vec<Attendance>, AppError> {
        let rows = sqlx::query_as::<_, Attendance>(
            "SELECT * FROM attendance WHERE student_id = ? ORDER BY recorded_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
