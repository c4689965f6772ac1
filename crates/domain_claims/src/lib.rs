//! Claims Intake Domain
//!
//! This crate implements claim submission: turning a multipart form into a
//! validated claim, checking the attached images, and persisting both while
//! the images go to object storage.
//!
//! # Submission Pipeline
//!
//! ```text
//! ClaimForm -> NewClaim -> validate_files -> begin tx -> insert claim
//!           -> upload each image -> insert image rows -> commit
//! ```
//!
//! An upload failure rolls the claim row back. Objects already written to
//! the bucket are not removed; the object store has no transactions.

pub mod claim;
pub mod image;
pub mod upload;
pub mod ports;
pub mod intake;
pub mod error;

pub use claim::{Claim, ClaimForm, NewClaim};
pub use image::ClaimImage;
pub use upload::{sanitize_filename, validate_files, UploadedFile};
pub use ports::{ClaimStore, ClaimTransaction, ObjectStore};
pub use intake::{ClaimIntakeService, SubmittedClaim};
pub use error::ClaimError;
