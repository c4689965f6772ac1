//! Core Kernel - Foundational types shared by the claims intake system
//!
//! This crate provides the building blocks used across all domain modules:
//! - Strongly-typed identifiers for users, claims and images
//! - Page requests and paged results for listing endpoints
//! - Field-level validation errors
//! - Port error and health-check abstractions implemented by adapters

pub mod identifiers;
pub mod pagination;
pub mod error;
pub mod ports;

pub use identifiers::{UserId, ClaimId, ImageId};
pub use pagination::{Page, PageRequest, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use error::{FieldError, describe_fields, field_errors};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
