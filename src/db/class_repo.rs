// src/db/class_repo.rs

use sqlx::MySqlPool;

use crate::{common::error::AppError, models::school::Class};

#[derive(Clone)]
pub struct ClassRepository {
    pool: MySqlPool,
}

impl ClassRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Class>, AppError> {
        let classes = sqlx::query_as::<_, Class>(
            "SELECT * FROM classes WHERE is_active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(classes)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Class>, AppError> {
        let class = sqlx::query_as::<_, Class>("SELECT * FROM classes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(class)
    }

    pub async fn create(
        &self,
        name: &str,
        teacher_id: Option<i64>,
        max_capacity: i32,
    ) -> Result<Class, AppError> {
        let result = sqlx::query(
            "INSERT INTO classes (name, teacher_id, max_capacity) VALUES (?, ?, ?)",
        )
        .bind(name)
        .bind(teacher_id)
        .bind(max_capacity)
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_id() as i64)
            .await?
            .ok_or(AppError::NotFound("Turma"))
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        teacher_id: Option<i64>,
        max_capacity: i32,
    ) -> Result<Class, AppError> {
        sqlx::query("UPDATE classes SET name = ?, teacher_id = ?, max_capacity = ? WHERE id = ?")
            .bind(name)
            .bind(teacher_id)
            .bind(max_capacity)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await?.ok_or(AppError::NotFound("Turma"))
    }

    // Bloqueia enquanto houver aluno ativo na turma. Aulas já registradas não
    // impedem a remoção, mas geram um aviso devolvido ao chamador.
    pub async fn soft_delete(&self, id: i64) -> Result<Option<String>, AppError> {
        let students: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM students WHERE class_id = ? AND is_active = TRUE",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if students > 0 {
            return Err(AppError::DeleteBlocked(format!(
                "A turma não pode ser removida: {students} aluno(s) ainda estão matriculados."
            )));
        }

        let sessions: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE class_id = ? AND is_active = TRUE",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        let result = sqlx::query("UPDATE classes SET is_active = FALSE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Turma"));
        }

        if sessions > 0 {
            return Ok(Some(format!(
                "Turma removida. {sessions} aula(s) permanecem no histórico."
            )));
        }
        Ok(None)
    }
}
