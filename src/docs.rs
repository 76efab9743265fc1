// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,

        // --- Dashboard ---
        handlers::dashboard::get_stats,

        // --- WhatsApp ---
        handlers::whatsapp::initialize,
        handlers::whatsapp::status,
        handlers::whatsapp::send_session_report,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Cadastro ---
            models::school::Subject,
            models::school::Teacher,
            models::school::Location,
            models::school::Class,
            models::school::Student,

            // --- Aulas ---
            models::session::SessionStatus,
            models::session::Session,
            models::attendance::AttendanceStatus,
            models::attendance::Attendance,
            models::report::HomeworkStatus,
            models::report::Report,

            // --- WhatsApp ---
            models::whatsapp::MessageType,
            models::whatsapp::DeliveryStatus,
            models::whatsapp::WhatsappLog,
            models::whatsapp::SessionRosterEntry,
            models::whatsapp::SessionReportSummary,
            models::whatsapp::ConnectionStatusResponse,

            // --- Dashboard ---
            models::dashboard::DashboardStats,

            // --- Payloads ---
            handlers::users::CreateUserPayload,
            handlers::users::UpdateUserPayload,
            handlers::students::StudentPayload,
            handlers::classes::ClassPayload,
            handlers::teachers::TeacherPayload,
            handlers::subjects::SubjectPayload,
            handlers::locations::LocationPayload,
            handlers::sessions::CreateSessionPayload,
            handlers::sessions::UpdateSessionPayload,
            handlers::attendance::RecordAttendancePayload,
            handlers::reports::RecordReportPayload,
            handlers::whatsapp::ManualMessagePayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação do painel"),
        (name = "WhatsApp", description = "Conexão e envio de mensagens aos responsáveis"),
        (name = "Dashboard", description = "Indicadores agregados")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
