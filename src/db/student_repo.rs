// src/db/student_repo.rs

use sqlx::MySqlPool;

use crate::{common::error::AppError, models::school::Student};

#[derive(Clone)]
pub struct StudentRepository {
    pool: MySqlPool,
}

impl StudentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Student>, AppError> {
        let students = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE is_active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>("SELECT * FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    pub async fn find_by_barcode(&self, barcode: &str) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(
            "SELECT * FROM students WHERE barcode = ? AND is_active = TRUE",
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;
        Ok(student)
    }

    // O maior sufixo numérico já usado nos códigos STUD######. A geração do
    // próximo código (max + 1) fica no StudentService.
    pub async fn max_barcode_suffix(&self) -> Result<i64, AppError> {
        let max: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(CAST(SUBSTRING(barcode, 5) AS UNSIGNED))
             FROM students WHERE barcode LIKE 'STUD%'",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(max.unwrap_or(0))
    }

    pub async fn create(
        &self,
        name: &str,
        barcode: &str,
        parent_phone: Option<&str>,
        parent_email: Option<&str>,
        class_id: Option<i64>,
    ) -> Result<Student, AppError> {
        let result = sqlx::query(
            "INSERT INTO students (name, barcode, parent_phone, parent_email, class_id)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(barcode)
        .bind(parent_phone)
        .bind(parent_email)
        .bind(class_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe um aluno com esse código de barras.".into(),
                    );
                }
            }
            e.into()
        })?;

        self.find_by_id(result.last_insert_id() as i64)
            .await?
            .ok_or(AppError::NotFound("Aluno"))
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        parent_phone: Option<&str>,
        parent_email: Option<&str>,
        class_id: Option<i64>,
    ) -> Result<Student, AppError> {
        sqlx::query(
            "UPDATE students SET name = ?, parent_phone = ?, parent_email = ?, class_id = ?
             WHERE id = ?",
        )
        .bind(name)
        .bind(parent_phone)
        .bind(parent_email)
        .bind(class_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or(AppError::NotFound("Aluno"))
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE students SET is_active = FALSE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Aluno"));
        }
        Ok(())
    }

    pub async fn count_active_in_class(&self, class_id: i64) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM students WHERE class_id = ? AND is_active = TRUE",
        )
        .bind(class_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
