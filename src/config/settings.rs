//! Application settings loaded from `config.toml`.
//!
//! The file is optional. Missing keys fall back to defaults, and the
//! `MAIL_SERVICE_URL` environment variable overrides the mail endpoint.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Page size used by the admin list views when `config.toml` does not set one
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows per page in paginated admin lists
    pub page_size: u64,
    /// Allowed campaign categories. Empty means any category is accepted.
    pub categories: Vec<String>,
    /// Notification email service
    pub mail: MailSettings,
}

/// Email service settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MailSettings {
    /// Full URL that accepts `POST` requests with a JSON email body
    pub endpoint: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            categories: [
                "Animals",
                "Community",
                "Education",
                "Emergency",
                "Environment",
                "Health",
                "Other",
            ]
            .iter()
            .map(|&c| c.to_string())
            .collect(),
            mail: MailSettings::default(),
        }
    }
}

impl Settings {
    /// Applies environment overrides on top of the file values.
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var("MAIL_SERVICE_URL") {
            if !url.trim().is_empty() {
                self.mail.endpoint = Some(url.trim().to_string());
            }
        }
        self
    }
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    let settings: Settings = toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })?;

    if settings.page_size == 0 || settings.page_size > crate::core::pagination::MAX_PAGE_SIZE {
        return Err(Error::Config {
            message: format!(
                "page_size must be between 1 and {}",
                crate::core::pagination::MAX_PAGE_SIZE
            ),
        });
    }

    Ok(settings)
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read, the TOML syntax is invalid,
/// or `page_size` is out of range.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;
    parse_settings(&contents)
}

/// Loads settings from `./config.toml`, falling back to defaults when the file
/// is absent.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    let settings = if path.exists() {
        load_settings(path)?
    } else {
        tracing::warn!("config.toml not found, using default settings");
        Settings::default()
    };
    Ok(settings.with_env_overrides())
}
