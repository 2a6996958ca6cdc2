use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::store::RepositoryError;
use crate::telemetry::TelemetryError;
use crate::workflows::applications::ServiceError;
use crate::workflows::sponsors::SponsorImportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use std::fmt;

const GENERIC_INTERNAL_MESSAGE: &str = "an internal server error occurred";

/// Process-level failure surfaced by the CLI entry points.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Store(RepositoryError),
    Import(SponsorImportError),
    Auth(AuthError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Store(err) => write!(f, "store error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Auth(err) => write!(f, "auth error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Store(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Auth(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RepositoryError> for AppError {
    fn from(value: RepositoryError) -> Self {
        Self::Store(value)
    }
}

impl From<SponsorImportError> for AppError {
    fn from(value: SponsorImportError) -> Self {
        Self::Import(value)
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        Self::Auth(value)
    }
}

/// Stable machine-readable failure category returned with every API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    NotFound,
    Unauthorized,
    Forbidden,
    Validation,
    Internal,
}

impl ErrorCategory {
    pub const fn status(self) -> StatusCode {
        match self {
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCategory::Forbidden => StatusCode::FORBIDDEN,
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// HTTP error body: `{ "error": <message>, "category": <category> }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub category: ErrorCategory,
    pub message: String,
}

impl ApiError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCategory::Validation, message)
    }

    /// Internal failures are always logged; the detail only reaches the
    /// caller when `expose_detail` is set (non-production environments).
    pub fn internal(detail: impl fmt::Display, expose_detail: bool) -> Self {
        tracing::error!(error = %detail, "request failed");
        let message = if expose_detail {
            detail.to_string()
        } else {
            GENERIC_INTERNAL_MESSAGE.to_string()
        };
        Self::new(ErrorCategory::Internal, message)
    }

    pub fn from_service(err: ServiceError, expose_detail: bool) -> Self {
        match err {
            ServiceError::Validation(err) => Self::validation(err.to_string()),
            ServiceError::CompanyNotFound(_) | ServiceError::ApplicationNotFound(_) => {
                Self::new(ErrorCategory::NotFound, err.to_string())
            }
            ServiceError::UnknownUser => Self::new(ErrorCategory::Unauthorized, err.to_string()),
            ServiceError::Repository(err) => Self::internal(err, expose_detail),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.category.status()
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::MissingCredentials => {
                Self::new(ErrorCategory::Unauthorized, value.to_string())
            }
            AuthError::InvalidToken(_) => {
                Self::new(ErrorCategory::Forbidden, "token is invalid or expired")
            }
            AuthError::Signing(_) => Self::internal(value, false),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.message, "category": self.category }));
        (self.status(), body).into_response()
    }
}
