// src/models/school.rs
//
// Entidades de cadastro: disciplinas, professores, salas, turmas e alunos.
// Tudo num arquivo só porque o cadastro inteiro anda junto nas telas do painel.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: i64,
    pub name: String,
    pub subject_id: Option<i64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub room_number: Option<String>,
    pub capacity: i32,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: i64,
    pub name: String,
    pub teacher_id: Option<i64>,
    pub max_capacity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub name: String,

    // Formato STUD######, gerado de forma monotônica pelo StudentService
    #[schema(example = "STUD000042")]
    pub barcode: String,

    pub parent_phone: Option<String>,
    pub parent_email: Option<String>,

    // Nullable: alunos podem ficar sem turma atribuída
    pub class_id: Option<i64>,

    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
