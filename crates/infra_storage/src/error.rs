//! Storage adapter errors

use core_kernel::PortError;
use thiserror::Error;

/// Service name reported in `PortError::ServiceUnavailable`
pub const SERVICE_NAME: &str = "object-store";

#[derive(Debug, Error)]
pub enum StorageError {
    /// The HTTP client could not be built
    #[error("Invalid storage client configuration: {0}")]
    Client(String),

    /// The request never got an answer
    #[error("Storage request failed: {0}")]
    Transport(String),

    /// The store answered with a non-success status
    #[error("Storage rejected upload with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// An object already exists under the key
    #[error("Object already exists: {0}")]
    AlreadyExists(String),
}

impl From<StorageError> for PortError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::AlreadyExists(key) => PortError::conflict(format!("object {key} already exists")),
            StorageError::Transport(message) => PortError::connection(message),
            other => PortError::unavailable(SERVICE_NAME, other.to_string()),
        }
    }
}
