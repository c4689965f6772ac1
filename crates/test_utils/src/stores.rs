//! In-Memory Port Implementations
//!
//! A process-local stand-in for the relational database. Users, claims and
//! images share one [`MemoryDatabase`] so the claim store can enforce the
//! user foreign key the way PostgreSQL does.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;

use core_kernel::{
    ClaimId, DomainPort, HealthCheckResult, HealthCheckable, ImageId, Page, PageRequest,
    PortError, UserId,
};
use domain_account::{User, UserStore};
use domain_claims::{Claim, ClaimImage, ClaimStore, ClaimTransaction, NewClaim, ObjectStore};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    claims: Vec<Claim>,
}

/// Shared tables plus id sequences
///
/// Sequences are not rolled back with a transaction, matching `BIGSERIAL`.
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: Mutex<Tables>,
    user_seq: AtomicI64,
    claim_seq: AtomicI64,
    image_seq: AtomicI64,
}

impl MemoryDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next(seq: &AtomicI64) -> i64 {
        seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of committed claims across all users
    pub fn claim_count(&self) -> usize {
        self.tables().claims.len()
    }

    /// Number of committed image rows across all claims
    pub fn image_count(&self) -> usize {
        self.tables().claims.iter().map(|c| c.images.len()).sum()
    }
}

/// `UserStore` over a [`MemoryDatabase`]
#[derive(Debug, Clone)]
pub struct InMemoryUserStore {
    db: Arc<MemoryDatabase>,
}

impl InMemoryUserStore {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

impl DomainPort for InMemoryUserStore {}

#[async_trait]
impl HealthCheckable for InMemoryUserStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-user-store", 0)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, email: &str, password_hash: &str) -> Result<User, PortError> {
        let mut tables = self.db.tables();
        if tables.users.iter().any(|u| u.email == email) {
            return Err(PortError::conflict(format!("duplicate email {email}")));
        }

        let user = User::new(
            UserId::new(MemoryDatabase::next(&self.db.user_seq)),
            email,
            password_hash,
        );
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PortError> {
        Ok(self.db.tables().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, PortError> {
        Ok(self.db.tables().users.iter().find(|u| u.id == id).cloned())
    }
}

/// `ClaimStore` over a [`MemoryDatabase`]
#[derive(Debug, Clone)]
pub struct InMemoryClaimStore {
    db: Arc<MemoryDatabase>,
}

impl InMemoryClaimStore {
    pub fn new(db: Arc<MemoryDatabase>) -> Self {
        Self { db }
    }
}

impl DomainPort for InMemoryClaimStore {}

#[async_trait]
impl HealthCheckable for InMemoryClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult::healthy("in-memory-claim-store", 0)
    }
}

#[async_trait]
impl ClaimStore for InMemoryClaimStore {
    async fn begin(&self) -> Result<Box<dyn ClaimTransaction>, PortError> {
        Ok(Box::new(InMemoryTransaction {
            db: self.db.clone(),
            pending: Vec::new(),
        }))
    }

    async fn list(&self, user_id: UserId, page: PageRequest) -> Result<Page<Claim>, PortError> {
        let tables = self.db.tables();
        let mut owned: Vec<&Claim> = tables.claims.iter().filter(|c| c.user_id == user_id).collect();
        owned.sort_by(|a, b| b.id.cmp(&a.id));

        let total = owned.len() as u64;
        let items = owned
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Ok(Page::new(items, total, page))
    }

    async fn get(&self, user_id: UserId, claim_id: ClaimId) -> Result<Option<Claim>, PortError> {
        Ok(self
            .db
            .tables()
            .claims
            .iter()
            .find(|c| c.id == claim_id && c.user_id == user_id)
            .cloned())
    }
}

/// Buffers claim writes until commit
pub struct InMemoryTransaction {
    db: Arc<MemoryDatabase>,
    pending: Vec<Claim>,
}

#[async_trait]
impl ClaimTransaction for InMemoryTransaction {
    async fn create(&mut self, user_id: UserId, claim: &NewClaim) -> Result<ClaimId, PortError> {
        if !self.db.tables().users.iter().any(|u| u.id == user_id) {
            return Err(PortError::not_found("User", user_id));
        }

        let id = ClaimId::new(MemoryDatabase::next(&self.db.claim_seq));
        self.pending.push(Claim {
            id,
            user_id,
            policy_number: claim.policy_number.clone(),
            date_of_accident: claim.date_of_accident,
            accident_type: claim.accident_type.clone(),
            description: claim.description.clone(),
            injuries_reported: claim.injuries_reported,
            damage_details: claim.damage_details.clone(),
            images: Vec::new(),
        });
        Ok(id)
    }

    async fn attach_images(
        &mut self,
        claim_id: ClaimId,
        filenames: &[String],
    ) -> Result<Vec<ImageId>, PortError> {
        let db = self.db.clone();
        let claim = self
            .pending
            .iter_mut()
            .find(|c| c.id == claim_id)
            .ok_or_else(|| PortError::not_found("Claim", claim_id))?;

        let ids: Vec<ImageId> = filenames
            .iter()
            .map(|name| {
                let id = ImageId::new(MemoryDatabase::next(&db.image_seq));
                claim.images.push(ClaimImage {
                    id,
                    claim_id,
                    image_file: name.clone(),
                });
                id
            })
            .collect();

        Ok(ids)
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        let this = *self;
        this.db.tables().claims.extend(this.pending);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        Ok(())
    }
}

/// Object store whose uploads always fail
#[derive(Debug, Default, Clone)]
pub struct FailingObjectStore;

impl DomainPort for FailingObjectStore {}

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn upload(
        &self,
        _bucket: &str,
        _key: &str,
        _content_type: &str,
        _bytes: Bytes,
    ) -> Result<(), PortError> {
        Err(PortError::unavailable("object-store", "bucket unreachable"))
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("failing://{bucket}/{key}")
    }
}
