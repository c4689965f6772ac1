//! Account domain errors

use core_kernel::{describe_fields, FieldError, PortError};
use thiserror::Error;

/// Errors that can occur in the account domain
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("User already exists")]
    EmailTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid input: {}", describe_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("User store error: {0}")]
    Store(#[from] PortError),
}
