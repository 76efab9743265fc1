// src/db/subject_repo.rs

use sqlx::MySqlPool;

use crate::{common::error::AppError, models::school::Subject};

#[derive(Clone)]
pub struct SubjectRepository {
    pool: MySqlPool,
}

impl SubjectRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Subject>, AppError> {
        let subjects = sqlx::query_as::<_, Subject>(
            "SELECT * FROM subjects WHERE is_active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(subjects)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Subject>, AppError> {
        let subject = sqlx::query_as::<_, Subject>("SELECT * FROM subjects WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(subject)
    }

    pub async fn create(&self, name: &str, description: Option<&str>) -> Result<Subject, AppError> {
        let result = sqlx::query("INSERT INTO subjects (name, description) VALUES (?, ?)")
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await?;

        self.find_by_id(result.last_insert_id() as i64)
            .await?
            .ok_or(AppError::NotFound("Disciplina"))
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        description: Option<&str>,
    ) -> Result<Subject, AppError> {
        sqlx::query("UPDATE subjects SET name = ?, description = ? WHERE id = ?")
            .bind(name)
            .bind(description)
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.find_by_id(id).await?.ok_or(AppError::NotFound("Disciplina"))
    }

    // Remoção bloqueada enquanto algum professor ativo referencia a disciplina
    pub async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let referencing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM teachers WHERE subject_id = ? AND is_active = TRUE",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if referencing > 0 {
            return Err(AppError::DeleteBlocked(format!(
                "A disciplina não pode ser removida: {referencing} professor(es) ainda a lecionam."
            )));
        }

        let result = sqlx::query("UPDATE subjects SET is_active = FALSE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Disciplina"));
        }
        Ok(())
    }
}
