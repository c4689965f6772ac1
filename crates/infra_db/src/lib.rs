//! Infrastructure Database Layer
//!
//! PostgreSQL implementations of the account and claims ports, built on
//! SQLx with runtime-checked queries.
//!
//! # Architecture
//!
//! The crate follows the repository pattern: each store owns a pool handle,
//! maps rows into domain types and translates `DatabaseError` into the
//! `PortError` the domain layer understands.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresClaimStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/claims")).await?;
//! run_migrations(&pool).await?;
//! let claims = PostgresClaimStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod migrate;
pub mod repositories;

pub use pool::{create_pool, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use migrate::run_migrations;
pub use repositories::{PostgresClaimStore, PostgresUserStore};
