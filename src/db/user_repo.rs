// src/db/user_repo.rs

use sqlx::types::Json;
use sqlx::MySqlPool;

use crate::{
    common::error::AppError,
    models::auth::{Role, User},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: MySqlPool,
}

impl UserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    // Busca um usuário ativo pelo username (para login)
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE username = ? AND is_active = TRUE",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE is_active = TRUE ORDER BY display_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        display_name: &str,
        role: Role,
        permissions: &[String],
    ) -> Result<User, AppError> {
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, display_name, role, permissions)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(username)
        .bind(password_hash)
        .bind(display_name)
        .bind(role)
        .bind(Json(permissions))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // Converte violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation(
                        "Já existe um usuário com esse nome.".into(),
                    );
                }
            }
            e.into()
        })?;

        self.find_by_id(result.last_insert_id() as i64)
            .await?
            .ok_or(AppError::NotFound("Usuário"))
    }

    pub async fn update(
        &self,
        id: i64,
        display_name: &str,
        role: Role,
        permissions: &[String],
        password_hash: Option<&str>,
    ) -> Result<User, AppError> {
        // A senha só é trocada quando o payload traz uma nova
        if let Some(hash) = password_hash {
            sqlx::query(
                "UPDATE users SET display_name = ?, role = ?, permissions = ?, password_hash = ?
                 WHERE id = ?",
            )
            .bind(display_name)
            .bind(role)
            .bind(Json(permissions))
            .bind(hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        } else {
            sqlx::query("UPDATE users SET display_name = ?, role = ?, permissions = ? WHERE id = ?")
                .bind(display_name)
                .bind(role)
                .bind(Json(permissions))
                .bind(id)
                .execute(&self.pool)
                .await?;
        }

        self.find_by_id(id).await?.ok_or(AppError::NotFound("Usuário"))
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET is_active = FALSE WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Usuário"));
        }
        Ok(())
    }
}
