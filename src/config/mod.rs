/// Runtime configuration from environment variables
pub mod app;

/// Database connection and table/index creation
pub mod database;

pub use app::AppConfig;
pub use database::{create_connection, create_tables};
