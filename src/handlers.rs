pub mod attendance;
pub mod auth;
pub mod classes;
pub mod dashboard;
pub mod locations;
pub mod reports;
pub mod sessions;
pub mod students;
pub mod subjects;
pub mod teachers;
pub mod users;
pub mod whatsapp;
