// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod whatsapp;

use crate::config::AppState;
use crate::middleware::auth::auth_middleware;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas de autenticação
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users).post(handlers::users::create_user))
        .route("/me", get(handlers::auth::get_me))
        .route("/permissions", get(handlers::users::list_permissions))
        .route(
            "/{id}",
            put(handlers::users::update_user).delete(handlers::users::delete_user),
        );

    let student_routes = Router::new()
        .route(
            "/",
            get(handlers::students::list_students).post(handlers::students::create_student),
        )
        .route("/barcode/{barcode}", get(handlers::students::get_student_by_barcode))
        .route(
            "/{id}",
            get(handlers::students::get_student)
                .put(handlers::students::update_student)
                .delete(handlers::students::delete_student),
        );

    let class_routes = Router::new()
        .route("/", get(handlers::classes::list_classes).post(handlers::classes::create_class))
        .route(
            "/{id}",
            put(handlers::classes::update_class).delete(handlers::classes::delete_class),
        );

    let teacher_routes = Router::new()
        .route(
            "/",
            get(handlers::teachers::list_teachers).post(handlers::teachers::create_teacher),
        )
        .route(
            "/{id}",
            put(handlers::teachers::update_teacher).delete(handlers::teachers::delete_teacher),
        );

    let subject_routes = Router::new()
        .route(
            "/",
            get(handlers::subjects::list_subjects).post(handlers::subjects::create_subject),
        )
        .route(
            "/{id}",
            put(handlers::subjects::update_subject).delete(handlers::subjects::delete_subject),
        );

    let location_routes = Router::new()
        .route(
            "/",
            get(handlers::locations::list_locations).post(handlers::locations::create_location),
        )
        .route(
            "/{id}",
            put(handlers::locations::update_location)
                .delete(handlers::locations::delete_location),
        );

    let session_routes = Router::new()
        .route(
            "/",
            get(handlers::sessions::list_sessions).post(handlers::sessions::create_session),
        )
        .route(
            "/{id}",
            get(handlers::sessions::get_session)
                .put(handlers::sessions::update_session)
                .delete(handlers::sessions::delete_session),
        )
        .route("/{id}/status", patch(handlers::sessions::update_session_status))
        .route("/{id}/roster", get(handlers::sessions::get_session_roster));

    let attendance_routes = Router::new()
        .route("/", post(handlers::attendance::record_attendance))
        .route("/session/{id}", get(handlers::attendance::list_session_attendance))
        .route("/student/{id}", get(handlers::attendance::list_student_attendance));

    let report_routes = Router::new()
        .route("/", post(handlers::reports::record_report))
        .route("/session/{id}", get(handlers::reports::list_session_reports))
        .route("/student/{id}", get(handlers::reports::list_student_reports));

    let whatsapp_routes = Router::new()
        .route("/initialize", post(handlers::whatsapp::initialize))
        .route("/status", get(handlers::whatsapp::status))
        .route("/pairing-code", get(handlers::whatsapp::pairing_code))
        .route("/disconnect", post(handlers::whatsapp::disconnect))
        .route("/send", post(handlers::whatsapp::send_manual_message))
        .route(
            "/send-session-report/{id}",
            post(handlers::whatsapp::send_session_report),
        )
        .route("/logs", get(handlers::whatsapp::list_logs));

    let dashboard_routes = Router::new().route("/stats", get(handlers::dashboard::get_stats));

    // Tudo que não é login passa pelo middleware de autenticação
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/students", student_routes)
        .nest("/api/classes", class_routes)
        .nest("/api/teachers", teacher_routes)
        .nest("/api/subjects", subject_routes)
        .nest("/api/locations", location_routes)
        .nest("/api/sessions", session_routes)
        .nest("/api/attendance", attendance_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/whatsapp", whatsapp_routes)
        .nest("/api/dashboard", dashboard_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_middleware));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await.expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
