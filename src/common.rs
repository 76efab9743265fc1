pub mod error;
pub use error::AppError;
pub mod response;
pub use response::ApiResponse;
