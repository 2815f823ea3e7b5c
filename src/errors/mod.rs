//! Error handling module for the facdir client.
//!
//! Provides centralized error types for the remote store, cache, and session
//! layers, plus the transient user-facing notices surfaced by operations.

use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const CONNECTIVITY_ERROR: &str = "CONNECTIVITY_ERROR";
    pub const REMOTE_REJECTED: &str = "REMOTE_REJECTED";
    pub const MALFORMED_PAYLOAD: &str = "MALFORMED_PAYLOAD";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Transport-level failure reaching the remote store (after retries)
    Connectivity(String),
    /// Remote store answered with a non-2xx status
    Remote {
        status: u16,
        message: Option<String>,
    },
    /// Response body did not match the expected structure
    MalformedPayload(String),
    /// Input rejected before any network call
    Validation(String),
    /// Local cache storage error
    Storage(String),
    /// Anything else
    Internal(String),
}

impl AppError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Connectivity(_) => codes::CONNECTIVITY_ERROR,
            AppError::Remote { .. } => codes::REMOTE_REJECTED,
            AppError::MalformedPayload(_) => codes::MALFORMED_PAYLOAD,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::Connectivity(msg) => msg.clone(),
            AppError::Remote { status, message } => match message {
                Some(msg) => format!("Remote store rejected the request ({}): {}", status, msg),
                None => format!("Remote store rejected the request ({})", status),
            },
            AppError::MalformedPayload(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Storage(msg) => msg.clone(),
            AppError::Internal(msg) => msg.clone(),
        }
    }

    /// Whether this error means the remote store could not be reached or
    /// answered unusably. Drives the connectivity downgrade in the
    /// reconciler and the edit fallback in the session.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            AppError::Connectivity(_) | AppError::Remote { .. } | AppError::MalformedPayload(_)
        )
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        tracing::debug!("Transport error: {:?}", err);
        AppError::Connectivity(format!("Transport error: {}", err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Cache storage error: {:?}", err);
        AppError::Storage(format!("Cache storage error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::MalformedPayload(format!("JSON error: {}", err))
    }
}

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A transient user-facing message. Operations never let failures escape as
/// panics; they convert them to notices at the operation boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
