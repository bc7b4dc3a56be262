//! # Application Error Types
//!
//! This module defines the error types shared by every stage of the offer
//! pipeline: configuration, the posted-offer store, the offers API and the
//! Telegram publisher.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Validation errors (offer records, inputs, etc.)
    Validation(String),
    /// Posted-offer store errors
    Database(String),
    /// Network/communication errors (offers API, image downloads)
    Network(String),
    /// Telegram Bot API errors
    Telegram(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Database(msg) => write!(f, "[DATABASE] {}", msg),
            AppError::Network(msg) => write!(f, "[NETWORK] {}", msg),
            AppError::Telegram(msg) => write!(f, "[TELEGRAM] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<teloxide::RequestError> for AppError {
    fn from(err: teloxide::RequestError) -> Self {
        AppError::Telegram(err.to_string())
    }
}

impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Config(format!("Invalid merchant pattern: {}", err))
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the application
pub mod error_logging {
    use tracing::error;

    /// Log store operation errors with the offer they concern
    pub fn log_database_error(
        error: &impl std::fmt::Display,
        operation: &str,
        offer_id: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            offer_id = ?offer_id,
            "Database operation failed"
        );
    }

    /// Log network/communication errors with connection context
    pub fn log_network_error(
        error: &impl std::fmt::Display,
        operation: &str,
        endpoint: Option<&str>,
        attempt_count: Option<u32>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            endpoint = ?endpoint,
            attempt_count = ?attempt_count,
            "Network operation failed"
        );
    }

    /// Log a failed channel post with offer context
    pub fn log_publish_error(
        error: &impl std::fmt::Display,
        offer_id: &str,
        merchant: &str,
        with_image: bool,
        consecutive_failures: u32,
    ) {
        error!(
            error = %error,
            offer_id = %offer_id,
            merchant = %merchant,
            with_image = %with_image,
            consecutive_failures = %consecutive_failures,
            "Publishing offer failed"
        );
    }

    /// Log configuration errors during startup
    pub fn log_config_error(error: &impl std::fmt::Display, operation: &str) {
        error!(
            error = %error,
            operation = %operation,
            "Configuration error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            AppError::Config("MAX_POSTS must be a valid number".to_string()).to_string(),
            "[CONFIG] MAX_POSTS must be a valid number"
        );
        assert_eq!(
            AppError::Telegram("chat not found".to_string()).to_string(),
            "[TELEGRAM] chat not found"
        );
    }

    #[test]
    fn test_regex_error_maps_to_config() {
        let err = regex::Regex::new("(unclosed").unwrap_err();
        match AppError::from(err) {
            AppError::Config(msg) => assert!(msg.starts_with("Invalid merchant pattern")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
