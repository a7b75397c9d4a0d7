//! Unified error handling for context and repository operations.
//!
//! Every failure in this workspace propagates unchanged to the immediate
//! caller; nothing here retries or recovers locally.

use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Context lifecycle
    #[error("Context initialization failed: {0}")]
    ContextInit(String),

    #[error("Context release failed: {0}")]
    ContextRelease(String),

    #[error("No context is held by this repository")]
    MissingContext,

    #[error("Context has already been released")]
    ContextReleased,

    #[error("Repository has been disposed")]
    RepositoryDisposed,

    // Configuration
    #[error("Configuration error: {0}")]
    Config(String),

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

impl AppError {
    /// Get a stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ContextInit(_) => "CONTEXT_INIT_FAILED",
            AppError::ContextRelease(_) => "CONTEXT_RELEASE_FAILED",
            AppError::MissingContext => "MISSING_CONTEXT",
            AppError::ContextReleased => "CONTEXT_RELEASED",
            AppError::RepositoryDisposed => "REPOSITORY_DISPOSED",
            AppError::Config(_) => "CONFIG_ERROR",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_missing_context(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing_context(self) -> AppResult<T> {
        self.ok_or(AppError::MissingContext)
    }
}

/// Convenience constructors
impl AppError {
    pub fn context_init(msg: impl Into<String>) -> Self {
        AppError::ContextInit(msg.into())
    }

    pub fn context_release(msg: impl Into<String>) -> Self {
        AppError::ContextRelease(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }
}
