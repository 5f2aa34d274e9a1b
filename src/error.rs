// HTTP API Error Types
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::api::format::{field_errors, flatten_messages};
use crate::api::validation::Violation;
use crate::auth::AuthError;
use crate::database::StoreError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(Vec<Violation>),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Client-facing messages
    pub fn messages(&self) -> Vec<String> {
        match self {
            ApiError::Validation(violations) => flatten_messages(violations),
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => vec![msg.clone()],
        }
    }

    /// Convert to JSON response body.
    ///
    /// Recognised validation failures:
    /// `{statusCode, message: "Validation failed", errors: {field: message}}`.
    /// Everything else: `{statusCode, message: [..], error: <reason phrase>}`.
    pub fn to_json(&self) -> Value {
        let status = self.status_code();

        if let ApiError::Validation(violations) = self {
            let errors = field_errors(violations);
            if !errors.is_empty() {
                return json!({
                    "statusCode": status.as_u16(),
                    "message": "Validation failed",
                    "errors": errors,
                });
            }
        }

        json!({
            "statusCode": status.as_u16(),
            "message": self.messages(),
            "error": status.canonical_reason().unwrap_or("Error"),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(violations: Vec<Violation>) -> Self {
        ApiError::Validation(violations)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => ApiError::not_found(msg),
            StoreError::Conflict(msg) => ApiError::conflict(msg),
            StoreError::Sqlx(sqlx::Error::PoolTimedOut) | StoreError::Sqlx(sqlx::Error::Io(_)) => {
                tracing::error!("Database unavailable: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingAuthorization
            | AuthError::MalformedAuthorization
            | AuthError::InvalidToken(_) => ApiError::unauthorized(err.to_string()),
            AuthError::InvalidSecret | AuthError::Hashing(_) => {
                tracing::error!("Auth failure: {}", err);
                ApiError::internal_server_error("Authentication is misconfigured")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(vec![Violation::Message(rejection.body_text())])
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.messages().join("; "))
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognised_validation_uses_errors_map() {
        let err = ApiError::validation(vec![Violation::field("name", "isNotEmpty", "กรุณากรอกชื่อ")]);
        let body = err.to_json();
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], "Validation failed");
        assert_eq!(body["errors"]["name"], "กรุณากรอกชื่อ");
    }

    #[test]
    fn unrecognised_validation_falls_back_to_generic_envelope() {
        let err = ApiError::validation(vec![Violation::field("rating", "range", "rating must be between 1 and 5")]);
        let body = err.to_json();
        assert_eq!(body["statusCode"], 400);
        assert_eq!(body["message"], json!(["rating must be between 1 and 5"]));
        assert_eq!(body["error"], "Bad Request");
    }

    #[test]
    fn not_found_envelope() {
        let body = ApiError::not_found("Project not found").to_json();
        assert_eq!(body, json!({"statusCode": 404, "message": ["Project not found"], "error": "Not Found"}));
    }
}
