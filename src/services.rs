pub mod auth;
pub use auth::AuthService;
pub mod student_service;
pub use student_service::StudentService;
pub mod notification_service;
pub use notification_service::NotificationService;
