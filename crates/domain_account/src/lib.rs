//! Account Domain
//!
//! This crate owns user accounts: who may sign in and how their passwords
//! are stored.
//!
//! # Flow
//!
//! ```text
//! Credentials -> validate -> UserStore lookup -> Argon2 hash/verify -> User
//! ```
//!
//! Persistence is reached only through the [`UserStore`] port, so the
//! service runs unchanged against PostgreSQL or an in-memory store.

pub mod user;
pub mod credentials;
pub mod password;
pub mod ports;
pub mod service;
pub mod error;

pub use user::User;
pub use credentials::Credentials;
pub use password::PasswordHasher;
pub use ports::UserStore;
pub use service::CredentialService;
pub use error::AccountError;
