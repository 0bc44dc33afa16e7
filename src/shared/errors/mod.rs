pub mod app_error;
pub mod field_errors;

pub use app_error::{AppError, AppResult};
pub use field_errors::FieldErrors;
