//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! `MonitorError`は`status_code()`と`external_message()`を提供し、
//! クエリAPIのエラーレスポンスを生成できます。

use axum::http::StatusCode;
use statusboard_common::error::CommonError;
use thiserror::Error;

/// statusboard error type
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Common layer error
    #[error(transparent)]
    Common(#[from] CommonError),

    /// Queried service has no status in the store
    #[error("Service not found: {0}")]
    ServiceNotFound(String),

    /// HTTP client construction error
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// I/O error (listener bind, serve)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MonitorError {
    /// Returns a safe error message for external clients.
    ///
    /// Full details (URLs, addresses) stay in server logs via `Display`.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Common(CommonError::Validation(_)) => "Invalid request",
            Self::Common(_) => "Request error",
            Self::ServiceNotFound(_) => "Service not found",
            Self::HttpClient(_) => "Internal server error",
            Self::Io(_) => "Internal server error",
            Self::Internal(_) => "Internal server error",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Common(CommonError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Common(_) => StatusCode::BAD_REQUEST,
            Self::ServiceNotFound(_) => StatusCode::NOT_FOUND,
            Self::HttpClient(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<reqwest::Error> for MonitorError {
    fn from(err: reqwest::Error) -> Self {
        Self::HttpClient(err.to_string())
    }
}

/// Result alias for statusboard operations
pub type MonitorResult<T> = Result<T, MonitorError>;
