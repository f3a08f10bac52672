/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `ApiResult<T>`; domain errors from the shared crate
/// convert into [`ApiError`] through the `From` impls below, so `?` is all a
/// handler needs.
///
/// # Status mapping
///
/// | Variant | Status |
/// |---|---|
/// | `BadRequest`, `ValidationError` | 400 |
/// | `Unauthorized` | 401 |
/// | `Forbidden` | 403 |
/// | `NotFound` | 404 |
/// | `InternalError` | 500 (logged, generic message to the client) |
///
/// # Response body
///
/// ```json
/// {
///   "error": "validation_error",
///   "message": "Request validation failed",
///   "details": [{ "field": "email", "message": "Invalid email address" }]
/// }
/// ```

use axum::{
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tasktrack_shared::auth::{
    context::AuthError, credentials::CredentialError, jwt::JwtError, password::PasswordError,
    policy::AuthzError,
};
use tasktrack_shared::store::RepositoryError;

/// Message for every token failure; causes are never told apart
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired token";

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Field-level validation failures (400)
    ValidationError(Vec<ValidationErrorDetail>),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

impl ValidationErrorDetail {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::Forbidden(msg) => ("forbidden", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert repository errors to API errors
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(entity) => ApiError::NotFound(format!("{} not found", entity)),
            RepositoryError::Duplicate(field) => ApiError::ValidationError(vec![
                ValidationErrorDetail::new(field, format!("{} already exists", field)),
            ]),
            RepositoryError::InvalidReference(field) => ApiError::ValidationError(vec![
                ValidationErrorDetail::new(field, "Referenced user does not exist"),
            ]),
            RepositoryError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

/// Convert credential errors to API errors
impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::DuplicateCredential => {
                ApiError::BadRequest("Username or email already exists".to_string())
            }
            CredentialError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid credentials".to_string())
            }
            CredentialError::WeakPassword(msg) => {
                ApiError::ValidationError(vec![ValidationErrorDetail::new("password", msg)])
            }
            CredentialError::Storage(e) => e.into(),
            CredentialError::Password(e) => e.into(),
            CredentialError::Join(e) => {
                ApiError::InternalError(format!("Password hashing task failed: {}", e))
            }
        }
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => {
                ApiError::Unauthorized("Authentication required".to_string())
            }
            AuthzError::Forbidden { .. } => ApiError::Forbidden("Insufficient permissions".to_string()),
        }
    }
}

/// Convert request authentication errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        tracing::debug!(error = %err, "Rejected bearer credentials");
        ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
    }
}

/// Convert JWT errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::Invalid(_) | JwtError::Expired => {
                ApiError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string())
            }
        }
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Convert validator errors to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    ValidationErrorDetail::new(
                        field.to_string(),
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("Invalid {}", field)),
                    )
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}
