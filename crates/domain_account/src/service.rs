//! Credential service: registration, sign-in and account lookup

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use core_kernel::UserId;

use crate::credentials::Credentials;
use crate::error::AccountError;
use crate::password::PasswordHasher;
use crate::ports::UserStore;
use crate::user::User;

/// Registers users and verifies their passwords
///
/// # Example
///
/// ```rust,ignore
/// let service = CredentialService::new(Arc::new(PostgresUserStore::new(pool)));
/// let user = service.register(Credentials::new("a@b.com", "secret")).await?;
/// let same = service.verify("a@b.com", "secret").await?;
/// ```
#[derive(Clone)]
pub struct CredentialService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl CredentialService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            hasher: PasswordHasher::new(),
        }
    }

    /// Creates a new account
    ///
    /// # Errors
    ///
    /// * `AccountError::Validation` - malformed email or password
    /// * `AccountError::EmailTaken` - an account with this email exists
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn register(&self, credentials: Credentials) -> Result<User, AccountError> {
        let credentials = credentials.validated()?;

        if self.store.find_by_email(&credentials.email).await?.is_some() {
            debug!("Registration rejected, email already registered");
            return Err(AccountError::EmailTaken);
        }

        let password_hash = self.hasher.hash(credentials.password).await?;

        // A concurrent registration can still win the race; the unique index
        // reports it as a conflict.
        let user = self
            .store
            .insert(&credentials.email, &password_hash)
            .await
            .map_err(|e| {
                if e.is_conflict() {
                    AccountError::EmailTaken
                } else {
                    AccountError::Store(e)
                }
            })?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Checks an email/password pair
    ///
    /// Unknown emails and wrong passwords produce the same error.
    #[instrument(skip(self, password))]
    pub async fn verify(&self, email: &str, password: &str) -> Result<User, AccountError> {
        let Some(user) = self.store.find_by_email(email.trim()).await? else {
            warn!("Login attempt for unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify(password.to_string(), user.password_hash.clone())
            .await?
        {
            warn!(user_id = %user.id, "Login attempt with wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Loads the account behind a token subject
    pub async fn find(&self, id: UserId) -> Result<User, AccountError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or(AccountError::UserNotFound)
    }

    /// Returns the underlying store, used by readiness checks
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }
}
