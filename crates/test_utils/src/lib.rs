//! Test Utilities Crate
//!
//! Shared test infrastructure for the claims intake test suite.
//!
//! # Modules
//!
//! - `stores`: in-memory implementations of the persistence ports
//! - `fixtures`: ready-made credentials, claims and image bytes
//! - `builders`: claim form builder with per-field overrides
//! - `database`: PostgreSQL testcontainer with the schema applied

pub mod stores;
pub mod fixtures;
pub mod builders;
pub mod database;

pub use stores::*;
pub use fixtures::*;
pub use builders::*;
pub use database::*;
