// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use utoipa::ToSchema;
use validator::Validate;

// Papel do usuário no painel. 'admin' implica todas as permissões,
// independente do conjunto gravado em `permissions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Supervisor,
    Teacher,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub display_name: String,
    pub role: Role,

    // Conjunto de capacidades "recurso:acao" (ex.: "students:edit").
    #[schema(value_type = Vec<String>, example = json!(["students:view", "attendance:edit"]))]
    pub permissions: Json<Vec<String>>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    // A verificação central de autorização: admin passa sempre,
    // os demais dependem do conjunto de slugs.
    pub fn has_permission(&self, slug: &str) -> bool {
        self.role == Role::Admin || self.permissions.0.iter().any(|p| p == slug)
    }
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 3, message = "O usuário deve ter no mínimo 3 caracteres."))]
    pub username: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token e o usuário logado
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,   // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with(role: Role, perms: &[&str]) -> User {
        User {
            id: 1,
            username: "maria".into(),
            password_hash: "x".into(),
            display_name: "Maria".into(),
            role,
            permissions: Json(perms.iter().map(|s| s.to_string()).collect()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_implica_todas_as_permissoes() {
        let admin = user_with(Role::Admin, &[]);
        assert!(admin.has_permission("students:delete"));
        assert!(admin.has_permission("whatsapp:edit"));
    }

    #[test]
    fn professor_depende_do_conjunto_gravado() {
        let teacher = user_with(Role::Teacher, &["attendance:edit", "students:view"]);
        assert!(teacher.has_permission("attendance:edit"));
        assert!(!teacher.has_permission("students:delete"));
    }
}
