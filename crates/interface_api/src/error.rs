//! API error handling
//!
//! Every failure leaves the API as `{"error": ...}`: a message string, or a
//! list of `{field, message}` objects for field validation.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use core_kernel::FieldError;
use domain_account::AccountError;
use domain_claims::ClaimError;

use crate::auth::AuthError;

/// Message returned in place of internal error details
const INTERNAL_MESSAGE: &str = "Internal server error";

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid fields: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::Validation(fields) => (StatusCode::BAD_REQUEST, json!({ "error": fields })),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                json!({ "error": "Request body too large" }),
            ),
            ApiError::Internal(detail) => {
                error!(error = %detail, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": INTERNAL_MESSAGE }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::EmailTaken => ApiError::BadRequest(err.to_string()),
            AccountError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AccountError::UserNotFound => ApiError::NotFound(err.to_string()),
            AccountError::Validation(fields) => ApiError::Validation(fields),
            AccountError::PasswordHash(_) | AccountError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::Validation(fields) => ApiError::Validation(fields),
            ClaimError::NoFilePart | ClaimError::NoSelectedFile | ClaimError::FileTypeNotAllowed => {
                ApiError::BadRequest(err.to_string())
            }
            ClaimError::ClaimNotFound(_) => ApiError::NotFound("Claim not found".to_string()),
            // The only reference a claim insert can miss is its owner
            ClaimError::Store(ref e) if e.is_not_found() => ApiError::NotFound("User not found".to_string()),
            ClaimError::Storage(_) | ClaimError::Store(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Signing(_) => ApiError::Internal(err.to_string()),
            _ => {
                warn!(error = %err, "Rejected token");
                ApiError::Unauthorized(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::PortError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(AccountError::EmailTaken), StatusCode::BAD_REQUEST),
            (ApiError::from(AccountError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (ApiError::from(AccountError::UserNotFound), StatusCode::NOT_FOUND),
            (ApiError::from(ClaimError::FileTypeNotAllowed), StatusCode::BAD_REQUEST),
            (ApiError::from(ClaimError::ClaimNotFound("CLM-1".into())), StatusCode::NOT_FOUND),
            (ApiError::from(ClaimError::Storage("bucket offline".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::from(ClaimError::Store(PortError::not_found("User", 7))),
                StatusCode::NOT_FOUND,
            ),
            (ApiError::from(AuthError::TokenExpired), StatusCode::UNAUTHORIZED),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_messages_are_kept_for_client_errors() {
        assert!(matches!(
            ApiError::from(ClaimError::NoFilePart),
            ApiError::BadRequest(msg) if msg == "No file part in the request"
        ));
        assert!(matches!(
            ApiError::from(AccountError::EmailTaken),
            ApiError::BadRequest(msg) if msg == "User already exists"
        ));
    }
}
