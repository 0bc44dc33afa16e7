// Shared kernel used by every bounded context.

pub mod application;
pub mod auth;
pub mod database;
pub mod errors;
pub mod utils;

pub use database::Database;
