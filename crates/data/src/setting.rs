//! Connection-string name setting.
//!
//! The process-wide slot keeps drop-in behavior for code that reads the name
//! from anywhere. New code should carry a [`DataSettings`] value instead.

use std::env;
use std::sync::{PoisonError, RwLock};

use common::{AppError, AppResult, DatabaseConfig};
use once_cell::sync::Lazy;

/// Name of the connection string used when none is configured
pub const DEFAULT_CONNECTION_STRING_NAME: &str = "EntityFrameworkConnectionString";

/// Environment variable overriding the connection string name
pub const CONNECTION_STRING_NAME_ENV: &str = "DATA_CONNECTION_STRING_NAME";

static CONNECTION_STRING_NAME: Lazy<RwLock<String>> =
    Lazy::new(|| RwLock::new(DEFAULT_CONNECTION_STRING_NAME.to_string()));

/// Current value of the process-wide connection string name.
pub fn connection_string_name() -> String {
    CONNECTION_STRING_NAME
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Overwrite the process-wide connection string name.
///
/// Meant to be called once during startup, before repositories are built.
pub fn set_connection_string_name(name: impl Into<String>) {
    let name = name.into();
    tracing::debug!("Connection string name set to {}", name);
    *CONNECTION_STRING_NAME
        .write()
        .unwrap_or_else(PoisonError::into_inner) = name;
}

/// Restore the process-wide connection string name to its default.
pub fn reset_connection_string_name() {
    set_connection_string_name(DEFAULT_CONNECTION_STRING_NAME);
}

/// Data access settings threaded through startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataSettings {
    /// Name of the variable holding the connection string
    pub connection_string_name: String,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self::new(DEFAULT_CONNECTION_STRING_NAME)
    }
}

impl DataSettings {
    pub fn new(connection_string_name: impl Into<String>) -> Self {
        Self {
            connection_string_name: connection_string_name.into(),
        }
    }

    /// Snapshot of the process-wide slot.
    pub fn from_global() -> Self {
        Self::new(connection_string_name())
    }

    /// Load settings from the environment (and `.env` if present).
    ///
    /// `DATA_CONNECTION_STRING_NAME` wins over the process-wide slot.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        match env::var(CONNECTION_STRING_NAME_ENV) {
            Ok(name) if !name.trim().is_empty() => Self::new(name),
            _ => Self::from_global(),
        }
    }

    /// Look up the connection string named by these settings in the environment.
    pub fn resolve_connection_string(&self) -> AppResult<String> {
        self.resolve_with(|key| env::var(key).ok())
    }

    /// Look up the connection string named by these settings with `lookup`.
    pub fn resolve_with<F>(&self, lookup: F) -> AppResult<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(&self.connection_string_name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            Some(_) => Err(AppError::config(format!(
                "connection string {} is empty",
                self.connection_string_name
            ))),
            None => Err(AppError::config(format!(
                "connection string {} is not set",
                self.connection_string_name
            ))),
        }
    }

    /// Database configuration for the resolved connection string.
    pub fn database_config(&self) -> AppResult<DatabaseConfig> {
        let url = self.resolve_connection_string()?;
        Ok(DatabaseConfig::from_env_with_url(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(key: &str) -> Option<String> {
        match key {
            "ReportingDb" => Some("postgres://reports/app".to_string()),
            "BlankDb" => Some("   ".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_default_settings_use_default_name() {
        assert_eq!(
            DataSettings::default().connection_string_name,
            DEFAULT_CONNECTION_STRING_NAME
        );
    }

    #[test]
    fn test_resolve_named_connection_string() {
        let settings = DataSettings::new("ReportingDb");
        assert_eq!(settings.resolve_with(lookup).unwrap(), "postgres://reports/app");
    }

    #[test]
    fn test_resolve_missing_connection_string() {
        let err = DataSettings::new("Unknown").resolve_with(lookup).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("Unknown")));
    }

    #[test]
    fn test_resolve_blank_connection_string() {
        let err = DataSettings::new("BlankDb").resolve_with(lookup).unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.contains("empty")));
    }
}
