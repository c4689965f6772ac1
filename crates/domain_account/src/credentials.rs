//! Email/password pairs submitted at registration and login

use serde::Deserialize;
use validator::Validate;

use core_kernel::field_errors;

use crate::error::AccountError;

/// Credentials as submitted by a client
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Credentials {
    #[validate(
        email(message = "value is not a valid email address"),
        length(max = 120, message = "ensure this value has at most 120 characters")
    )]
    pub email: String,

    #[validate(length(min = 1, max = 128, message = "ensure this value has between 1 and 128 characters"))]
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Checks the shape of the credentials before any store access
    pub fn validated(self) -> Result<Self, AccountError> {
        let normalized = Self::new(self.email, self.password);
        normalized
            .validate()
            .map_err(|e| AccountError::Validation(field_errors(&e)))?;
        Ok(normalized)
    }
}
