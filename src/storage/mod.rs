//! Storage module for database and configuration.

pub mod config;
pub mod database;
pub mod progress_store;
pub mod schema;

pub use config::{load_config, save_config, AppConfig, ConfigError, ServerSettings};
pub use database::{Database, DatabaseError};
pub use progress_store::ProgressStore;
