//! Claims Domain Ports
//!
//! Three seams separate the intake pipeline from its infrastructure:
//!
//! - [`ClaimStore`] reads claims and opens write transactions
//! - [`ClaimTransaction`] groups the claim and image inserts of one submission
//! - [`ObjectStore`] receives the image bytes
//!
//! `infra_db` implements the first two on PostgreSQL, `infra_storage` the
//! last one over HTTP.

use async_trait::async_trait;
use bytes::Bytes;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, ImageId, Page, PageRequest, PortError, UserId};

use crate::claim::{Claim, NewClaim};

#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    /// Opens a write transaction
    async fn begin(&self) -> Result<Box<dyn ClaimTransaction>, PortError>;

    /// Claims owned by `user_id`, newest id first
    async fn list(&self, user_id: UserId, page: PageRequest) -> Result<Page<Claim>, PortError>;

    /// A single claim, only if owned by `user_id`
    async fn get(&self, user_id: UserId, claim_id: ClaimId) -> Result<Option<Claim>, PortError>;
}

/// An open write transaction
///
/// Nothing is visible to readers until [`commit`](Self::commit). Dropping
/// the transaction without committing discards its writes.
#[async_trait]
pub trait ClaimTransaction: Send {
    /// Inserts the claim row
    ///
    /// Fails with `PortError::NotFound` when `user_id` does not exist.
    async fn create(&mut self, user_id: UserId, claim: &NewClaim) -> Result<ClaimId, PortError>;

    /// Inserts one image row per object key, returning ids in input order
    async fn attach_images(
        &mut self,
        claim_id: ClaimId,
        filenames: &[String],
    ) -> Result<Vec<ImageId>, PortError>;

    async fn commit(self: Box<Self>) -> Result<(), PortError>;

    async fn rollback(self: Box<Self>) -> Result<(), PortError>;
}

/// Bucket-based object storage
#[async_trait]
pub trait ObjectStore: DomainPort {
    /// Writes `bytes` under `key`; an existing object is not overwritten
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<(), PortError>;

    /// Public URL of an object
    fn public_url(&self, bucket: &str, key: &str) -> String;
}
