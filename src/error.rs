//! # Error Handling
//!
//! Layered error types for the ONG backend. Repositories raise
//! [`RepositoryError`], services raise [`ServiceError`], and the HTTP boundary
//! renders everything as [`ApiError`], which serializes to the same
//! `{ isSuccess, message, error, data }` envelope successful calls use.

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::auth::AuthError;
use crate::handlers::types::ApiResponse;
use crate::storage::ImageStoreError;
use crate::telemetry;

/// Text returned in place of infrastructure causes when details are hidden.
pub const GENERIC_ERROR_DETAIL: &str = "An internal error occurred";

/// Failure envelope returned by every endpoint
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Always `false`
    pub is_success: bool,
    /// Short failure message
    #[schema(value_type = String, example = "User not found.")]
    pub message: Box<str>,
    /// Underlying cause, when one is known
    #[schema(value_type = Option<String>)]
    pub error: Option<Box<str>>,
    /// Default payload of the failed operation (e.g. `false`), otherwise null
    #[schema(value_type = Option<Object>)]
    pub data: Option<serde_json::Value>,
    /// Error code for programmatic handling
    #[schema(value_type = String, example = "NOT_FOUND")]
    pub code: Box<str>,
    /// Correlation trace ID for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub trace_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        Self {
            status,
            is_success: false,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            error: None,
            data: None,
            trace_id: telemetry::current_trace_id().map(String::into_boxed_str),
        }
    }

    /// Builds an error from a failure envelope produced by a handler.
    pub fn from_envelope<T: Serialize>(
        status: StatusCode,
        code: &str,
        envelope: ApiResponse<T>,
    ) -> Self {
        let mut error = Self::new(status, code.to_string(), envelope.message);
        error.error = envelope.error.map(String::into_boxed_str);
        error.data = envelope
            .data
            .and_then(|data| serde_json::to_value(data).ok());
        error
    }

    /// Attach the underlying cause
    pub fn with_error<S: Into<String>>(mut self, cause: S) -> Self {
        self.error = Some(cause.into().into_boxed_str());
        self
    }

    /// Maps a service failure to its status code and envelope.
    ///
    /// `message` is the endpoint's short failure text. Infrastructure causes
    /// are always logged; they reach the client only when `expose_details` is set.
    pub fn from_service(error: ServiceError, message: &str, expose_details: bool) -> Self {
        let status = error.status_code();
        let code = error.error_code();

        let cause = if error.is_infrastructure() {
            tracing::error!(error = %error, "request failed on infrastructure error");
            if expose_details {
                error.to_string()
            } else {
                GENERIC_ERROR_DETAIL.to_string()
            }
        } else {
            tracing::debug!(error = %error, "request rejected");
            error.to_string()
        };

        Self::from_envelope::<()>(status, code, ApiResponse::failure(message, cause))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, axum::Json(self)).into_response()
    }
}

/// Create an unauthorized error (401)
pub fn unauthorized(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    ApiError::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg)
}

/// Create a forbidden error (403)
pub fn forbidden(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Insufficient permissions");
    ApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg)
}

/// Create a validation error (400)
pub fn validation_error(message: &str, cause: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "VALIDATION_FAILED", message).with_error(cause)
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let cause = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        validation_error("Invalid request body.", cause)
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        validation_error("Invalid path parameter.", rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        validation_error("Invalid form data.", error.body_text())
    }
}

/// Errors raised by the repository layer
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(sea_orm::DbErr),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Wraps a SeaORM error, classifying unique-key violations as conflicts.
    pub fn database_error(error: sea_orm::DbErr) -> Self {
        if is_unique_violation(&error) {
            tracing::debug!(?error, "Unique constraint violation detected");
            return RepositoryError::Conflict("Resource already exists".to_string());
        }
        RepositoryError::Database(error)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        RepositoryError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        RepositoryError::NotFound(message.into())
    }
}

fn is_unique_violation(error: &sea_orm::DbErr) -> bool {
    use sea_orm::RuntimeErr;

    const PG_UNIQUE: &str = "23505";
    const SQLITE_DUPLICATE_CODES: &[&str] = &["1555", "2067"];

    let runtime_err = match error {
        sea_orm::DbErr::Query(RuntimeErr::SqlxError(sqlx_err))
        | sea_orm::DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) => sqlx_err,
        _ => return false,
    };

    let Some(db_error) = runtime_err.as_database_error() else {
        return false;
    };

    if db_error.is_unique_violation() {
        return true;
    }

    db_error
        .code()
        .is_some_and(|code| code == PG_UNIQUE || SQLITE_DUPLICATE_CODES.contains(&code.as_ref()))
}

/// Errors raised by the service layer
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Repository(RepositoryError),
    #[error(transparent)]
    Storage(#[from] ImageStoreError),
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound(message) => ServiceError::NotFound(message),
            RepositoryError::Validation(message) => ServiceError::Validation(message),
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            other => ServiceError::Repository(other),
        }
    }
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::NotFound(_) | ServiceError::InvalidCredentials => StatusCode::NOT_FOUND,
            ServiceError::Auth(_) => StatusCode::UNAUTHORIZED,
            ServiceError::Validation(_)
            | ServiceError::Conflict(_)
            | ServiceError::Repository(_)
            | ServiceError::Storage(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
            ServiceError::Auth(_) => "UNAUTHORIZED",
            ServiceError::Validation(_) => "VALIDATION_FAILED",
            ServiceError::Conflict(_) => "CONFLICT",
            ServiceError::Repository(_) => "DATABASE_ERROR",
            ServiceError::Storage(err) if err.is_client_error() => "VALIDATION_FAILED",
            ServiceError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether the cause comes from the database or the filesystem rather
    /// than from the request itself.
    pub fn is_infrastructure(&self) -> bool {
        match self {
            ServiceError::Repository(_) => true,
            ServiceError::Storage(err) => !err.is_client_error(),
            _ => false,
        }
    }
}
