//! Account Domain Ports
//!
//! The `UserStore` trait is everything the account domain needs from
//! persistence. `infra_db` provides the PostgreSQL adapter; `test_utils`
//! provides an in-memory one.

use async_trait::async_trait;

use core_kernel::{DomainPort, HealthCheckable, PortError, UserId};

use crate::user::User;

#[async_trait]
pub trait UserStore: DomainPort + HealthCheckable {
    /// Persists a new user
    ///
    /// Fails with `PortError::Conflict` when the email is already taken.
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, PortError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PortError>;
}
