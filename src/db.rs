pub mod user_repo;
pub use user_repo::UserRepository;
pub mod student_repo;
pub use student_repo::StudentRepository;
pub mod class_repo;
pub use class_repo::ClassRepository;
pub mod teacher_repo;
pub use teacher_repo::TeacherRepository;
pub mod subject_repo;
pub use subject_repo::SubjectRepository;
pub mod location_repo;
pub use location_repo::LocationRepository;
pub mod session_repo;
pub use session_repo::SessionRepository;
pub mod attendance_repo;
pub use attendance_repo::AttendanceRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
pub mod whatsapp_log_repo;
pub use whatsapp_log_repo::WhatsappLogRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
