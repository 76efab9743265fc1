// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Role, User},
};

/// O trait que define o que é uma permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// O extractor guardião: presença do tipo na assinatura do handler já
/// garante a checagem antes do corpo rodar.
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        let required = T::slug();
        if !user.has_permission(required) {
            return Err(AppError::Forbidden(format!(
                "Você precisa da permissão '{required}' para realizar esta ação."
            )));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $slug:literal) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn slug() -> &'static str {
                $slug
            }
        }
    };
}

permission!(PermUsersManage, "users:manage");

permission!(PermStudentsView, "students:view");
permission!(PermStudentsEdit, "students:edit");
permission!(PermStudentsDelete, "students:delete");

permission!(PermClassesView, "classes:view");
permission!(PermClassesEdit, "classes:edit");
permission!(PermClassesDelete, "classes:delete");

permission!(PermTeachersView, "teachers:view");
permission!(PermTeachersEdit, "teachers:edit");
permission!(PermTeachersDelete, "teachers:delete");

permission!(PermSubjectsView, "subjects:view");
permission!(PermSubjectsEdit, "subjects:edit");
permission!(PermSubjectsDelete, "subjects:delete");

permission!(PermLocationsView, "locations:view");
permission!(PermLocationsEdit, "locations:edit");
permission!(PermLocationsDelete, "locations:delete");

permission!(PermSessionsView, "sessions:view");
permission!(PermSessionsEdit, "sessions:edit");
permission!(PermSessionsDelete, "sessions:delete");

permission!(PermAttendanceView, "attendance:view");
permission!(PermAttendanceEdit, "attendance:edit");

permission!(PermReportsView, "reports:view");
permission!(PermReportsEdit, "reports:edit");

permission!(PermWhatsappView, "whatsapp:view");
permission!(PermWhatsappSend, "whatsapp:send");
permission!(PermWhatsappManage, "whatsapp:manage");

permission!(PermDashboardView, "dashboard:view");

/// O catálogo completo, na ordem das telas do painel
pub const ALL_PERMISSIONS: &[&str] = &[
    "users:manage",
    "students:view",
    "students:edit",
    "students:delete",
    "classes:view",
    "classes:edit",
    "classes:delete",
    "teachers:view",
    "teachers:edit",
    "teachers:delete",
    "subjects:view",
    "subjects:edit",
    "subjects:delete",
    "locations:view",
    "locations:edit",
    "locations:delete",
    "sessions:view",
    "sessions:edit",
    "sessions:delete",
    "attendance:view",
    "attendance:edit",
    "reports:view",
    "reports:edit",
    "whatsapp:view",
    "whatsapp:send",
    "whatsapp:manage",
    "dashboard:view",
];

// Conjunto inicial sugerido na criação de um usuário. Admin nem consulta a
// lista (tem passe livre no User::has_permission), então fica vazio.
pub fn default_permissions(role: Role) -> Vec<String> {
    let slugs: &[&str] = match role {
        Role::Admin => &[],
        Role::Supervisor => &[
            "students:view",
            "students:edit",
            "students:delete",
            "classes:view",
            "classes:edit",
            "classes:delete",
            "teachers:view",
            "teachers:edit",
            "teachers:delete",
            "subjects:view",
            "subjects:edit",
            "subjects:delete",
            "locations:view",
            "locations:edit",
            "locations:delete",
            "sessions:view",
            "sessions:edit",
            "sessions:delete",
            "attendance:view",
            "attendance:edit",
            "reports:view",
            "reports:edit",
            "whatsapp:view",
            "whatsapp:send",
            "whatsapp:manage",
            "dashboard:view",
        ],
        Role::Teacher => &[
            "students:view",
            "classes:view",
            "sessions:view",
            "attendance:view",
            "attendance:edit",
            "reports:view",
            "reports:edit",
            "whatsapp:view",
            "whatsapp:send",
            "dashboard:view",
        ],
    };
    slugs.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalogo_nao_tem_slug_repetido() {
        let unique: HashSet<_> = ALL_PERMISSIONS.iter().collect();
        assert_eq!(unique.len(), ALL_PERMISSIONS.len());
    }

    #[test]
    fn conjuntos_padrao_so_usam_slugs_do_catalogo() {
        for role in [Role::Admin, Role::Supervisor, Role::Teacher] {
            for slug in default_permissions(role) {
                assert!(ALL_PERMISSIONS.contains(&slug.as_str()), "slug fora do catálogo: {slug}");
            }
        }
    }

    #[test]
    fn professor_nao_gerencia_usuarios() {
        let perms = default_permissions(Role::Teacher);
        assert!(!perms.iter().any(|p| p == "users:manage"));
        assert!(perms.iter().any(|p| p == "attendance:edit"));
    }
}
