pub mod auth;
pub mod school;
pub mod session;
pub mod attendance;
pub mod report;
pub mod whatsapp;
pub mod dashboard;
