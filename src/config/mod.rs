/// Database connection and schema management
pub mod database;

/// Application settings from config.toml
pub mod settings;

/// Bootstrap administrator ids from environment variables
pub mod users;
