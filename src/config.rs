// src/config.rs

use sqlx::{mysql::MySqlPoolOptions, MySqlPool};
use std::{env, sync::Arc, time::Duration};

use crate::{
    db::{
        AttendanceRepository, ClassRepository, DashboardRepository, LocationRepository,
        ReportRepository, SessionRepository, StudentRepository, SubjectRepository,
        TeacherRepository, UserRepository, WhatsappLogRepository,
    },
    services::{AuthService, NotificationService, StudentService},
    whatsapp::{BridgeTransport, WhatsappConfig, WhatsappGateway},
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: MySqlPool,
    pub jwt_secret: String,

    pub user_repo: UserRepository,
    pub student_repo: StudentRepository,
    pub class_repo: ClassRepository,
    pub teacher_repo: TeacherRepository,
    pub subject_repo: SubjectRepository,
    pub location_repo: LocationRepository,
    pub session_repo: SessionRepository,
    pub attendance_repo: AttendanceRepository,
    pub report_repo: ReportRepository,
    pub whatsapp_log_repo: WhatsappLogRepository,
    pub dashboard_repo: DashboardRepository,

    pub auth_service: AuthService,
    pub student_service: StudentService,
    pub notification_service: NotificationService,

    // Injetado em vez de global: os handlers e o NotificationService
    // compartilham a mesma instância via Arc
    pub whatsapp: Arc<WhatsappGateway>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        let db_pool = MySqlPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let student_repo = StudentRepository::new(db_pool.clone());
        let class_repo = ClassRepository::new(db_pool.clone());
        let teacher_repo = TeacherRepository::new(db_pool.clone());
        let subject_repo = SubjectRepository::new(db_pool.clone());
        let location_repo = LocationRepository::new(db_pool.clone());
        let session_repo = SessionRepository::new(db_pool.clone());
        let attendance_repo = AttendanceRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());
        let whatsapp_log_repo = WhatsappLogRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret.clone());
        let student_service = StudentService::new(student_repo.clone());

        let whatsapp_config = WhatsappConfig::from_env();
        let transport = BridgeTransport::new(whatsapp_config.clone());
        let whatsapp = WhatsappGateway::new(whatsapp_config, transport);

        let notification_service = NotificationService::new(
            session_repo.clone(),
            class_repo.clone(),
            whatsapp_log_repo.clone(),
            whatsapp.clone(),
        );

        Ok(Self {
            db_pool,
            jwt_secret,
            user_repo,
            student_repo,
            class_repo,
            teacher_repo,
            subject_repo,
            location_repo,
            session_repo,
            attendance_repo,
            report_repo,
            whatsapp_log_repo,
            dashboard_repo,
            auth_service,
            student_service,
            notification_service,
            whatsapp,
        })
    }
}
