// src/db/location_repo.rs

use sqlx::MySqlPool;

use crate::{common::error::AppError, models::school::Location};

#[derive(Clone)]
pub struct LocationRepository {
    pool: MySqlPool,
}

impl LocationRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Location>, AppError> {
        let locations = sqlx::query_as::<_, Location>(
            "SELECT * FROM locations WHERE is_active = TRUE ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(locations)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Location>, AppError> {
        let location = sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(location)
    }

    pub async fn create(
        &self,
        name: &str,
        room_number: Option<&str>,
        capacity: i32,
        description: Option<&str>,
    ) -> Result<Location, AppError> {
        let result = sqlx::query(
            "INSERT INTO locations (name, room_number, capacity, description) VALUES (?, ?, ?, ?)",
        )
        .bind(name)
        .bind(room_number)
        .bind(capacity)
        .bind(description)
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_id() as i64)
            .await?
            .ok_or(AppError::NotFound("Sala"))
    }

    pub async fn update(
        &self,
        id: i64,
        name: &str,
        room_number: Option<&str>,
        capacity: i32,
        description: Option<&str>,
    ) -> Result<Location, AppError> {
        sqlx::query(
            "UPDATE locations SET name = ?, room_number = ?, capacity = ?, description = ?
             WHERE id = ?",
        )
        .bind(name)
        .bind(room_number)
        .bind(capacity)
        .bind(description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or(AppError::NotFound("Sala"))
    }

    // Remoção bloqueada enquanto alguma aula referencia a sala
    pub async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let referencing: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM sessions WHERE location_id = ? AND is_active = TRUE",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        if referencing > 0 {
            return Err(AppError::DeleteBlocked(format!(
                "A sala não pode ser removida: {referencing} aula(s) ainda a utilizam."
            )));
        }

        let result = sqlx::query("UPDATE locations SET is_active = FALSE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Sala"));
        }
        Ok(())
    }
}
