//! Claims domain errors

use core_kernel::{describe_fields, FieldError, PortError};
use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid claim: {}", describe_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("No file part in the request")]
    NoFilePart,

    #[error("No selected file")]
    NoSelectedFile,

    #[error("File type not allowed")]
    FileTypeNotAllowed,

    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("Upload failed: {0}")]
    Storage(String),

    #[error("Claim store error: {0}")]
    Store(#[from] PortError),
}
