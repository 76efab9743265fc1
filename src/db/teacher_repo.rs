// src/db/teacher_repo.rs

use sqlx::MySqlPool;

use crate::{common::error::AppError, models::school::Teacher};

#[derive(Clone)]
pub struct TeacherRepository {
    pool: MySqlPool,
}

impl TeacherRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Teacher>, AppError> {
        let teachers = sqlx::query_as::<_, Teacher>(
            "SELECT * FROM teachers WHERE is_active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(teachers)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Teacher>, AppError> {
        let teacher = sqlx::query_as::<_, Teacher>("SELECT * FROM teachers WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(teacher)
    }

    pub async fn create(
        &self,
        name: &str,
        subject_id: Option<i64>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Teacher, AppError> {
        let result = sqlx::query(
            "INSERT INTO teachers (name, subject_id, phone, email) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(subject_id)
        .bind(phone)
        .bind(email)
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_id() as i64)
            .await?
            .ok_or(AppError::NotFound("Professor"))
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        subject_id: Option<i64>,
        phone: Option<&str>,
        email: Option<&str>,
    ) -> Result<Teacher, AppError> {
        sqlx::query(
            "UPDATE teachers SET name = ?, subject_id = ?, phone = ?, email = ? WHERE id = ?",
        )
        .bind(name)
        .bind(subject_id)
        .bind(phone)
        .bind(email)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or(AppError::NotFound("Professor"))
    }

    // Remoção bloqueada enquanto alguma turma ativa referencia o professor
    pub async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let referencing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM classes WHERE teacher_id = ? AND is_active = TRUE",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if referencing > 0 {
            return Err(AppError::DeleteBlocked(format!(
                "O professor não pode ser removido: {referencing} turma(s) ainda o referenciam."
            )));
        }

        let result = sqlx::query("UPDATE teachers SET is_active = FALSE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Professor"));
        }
        Ok(())
    }
}
