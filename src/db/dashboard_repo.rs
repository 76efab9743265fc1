// src/db/dashboard_repo.rs

use rust_decimal::Decimal;
use sqlx::MySqlPool;

use crate::{common::error::AppError, models::dashboard::DashboardStats};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: MySqlPool,
}

impl DashboardRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    // Snapshot consistente dos indicadores do painel: todas as leituras saem
    // da mesma transação.
    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let mut tx = self.pool.begin().await?;

        let total_students: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM students WHERE is_active = TRUE")
                .fetch_one(&mut *tx)
                .await?;

        let total_classes: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM classes WHERE is_active = TRUE")
                .fetch_one(&mut *tx)
                .await?;

        let total_teachers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM teachers WHERE is_active = TRUE")
                .fetch_one(&mut *tx)
                .await?;

        let sessions_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions
             WHERE is_active = TRUE AND DATE(starts_at) = CURDATE()",
        )
        .fetch_one(&mut *tx)
        .await?;

        // Presenças de hoje (atrasado e dispensado contam como presentes)
        let present_today: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM attendance a
             JOIN sessions s ON s.id = a.session_id
             WHERE DATE(s.starts_at) = CURDATE() AND a.status <> 'absent'",
        )
        .fetch_one(&mut *tx)
        .await?;

        // Percentual de presença nos últimos 30 dias
        let attendance_rate_30d: Option<Decimal> = sqlx::query_scalar(
            "SELECT AVG(CASE WHEN a.status <> 'absent' THEN 100.0 ELSE 0.0 END)
             FROM attendance a
             JOIN sessions s ON s.id = a.session_id
             WHERE s.starts_at >= NOW() - INTERVAL 30 DAY",
        )
        .fetch_one(&mut *tx)
        .await?;

        let average_rating: Option<Decimal> =
            sqlx::query_scalar("SELECT AVG(teacher_rating) FROM reports")
                .fetch_one(&mut *tx)
                .await?;

        let messages_sent_7d: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM whatsapp_logs
             WHERE delivery_status = 'sent' AND created_at >= NOW() - INTERVAL 7 DAY",
        )
        .fetch_one(&mut *tx)
        .await?;

        let messages_failed_7d: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM whatsapp_logs
             WHERE delivery_status = 'failed' AND created_at >= NOW() - INTERVAL 7 DAY",
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardStats {
            total_students,
            total_classes,
            total_teachers,
            sessions_today,
            present_today,
            attendance_rate_30d,
            average_rating,
            messages_sent_7d,
            messages_failed_7d,
        })
    }
}
