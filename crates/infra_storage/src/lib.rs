//! Object Storage Adapters
//!
//! Implementations of the claims domain `ObjectStore` port:
//!
//! - [`SupabaseStorage`] talks to a Supabase Storage compatible HTTP API
//! - [`InMemoryObjectStore`] keeps objects in process, for local runs and tests

pub mod supabase;
pub mod memory;
pub mod error;

pub use supabase::{SupabaseConfig, SupabaseStorage};
pub use memory::InMemoryObjectStore;
pub use error::StorageError;
