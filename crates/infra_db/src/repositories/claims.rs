//! PostgreSQL claim store
//!
//! Claims and their images live in two tables joined by `images.claim_id`.
//! Writes go through [`PgClaimTransaction`] so a claim and its image rows
//! become visible together.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use core_kernel::{
    ClaimId, DomainPort, HealthCheckResult, HealthCheckable, ImageId, Page, PageRequest,
    PortError, UserId,
};
use domain_claims::{Claim, ClaimImage, ClaimStore, ClaimTransaction, NewClaim};

use crate::error::DatabaseError;

/// Row shape of the `claims` table
#[derive(Debug, Clone, FromRow)]
pub struct ClaimRow {
    pub id: i64,
    pub user_id: i64,
    pub policy_number: String,
    pub date_of_accident: DateTime<Utc>,
    pub accident_type: String,
    pub description: String,
    pub injuries_reported: bool,
    pub damage_details: String,
}

/// Row shape of the `images` table
#[derive(Debug, Clone, FromRow)]
pub struct ImageRow {
    pub id: i64,
    pub claim_id: i64,
    pub image_file: String,
}

impl ClaimRow {
    fn into_claim(self, images: Vec<ClaimImage>) -> Claim {
        Claim {
            id: ClaimId::new(self.id),
            user_id: UserId::new(self.user_id),
            policy_number: self.policy_number,
            date_of_accident: self.date_of_accident,
            accident_type: self.accident_type,
            description: self.description,
            injuries_reported: self.injuries_reported,
            damage_details: self.damage_details,
            images,
        }
    }
}

impl From<ImageRow> for ClaimImage {
    fn from(row: ImageRow) -> Self {
        ClaimImage {
            id: ImageId::new(row.id),
            claim_id: ClaimId::new(row.claim_id),
            image_file: row.image_file,
        }
    }
}

const CLAIM_COLUMNS: &str = "id, user_id, policy_number, date_of_accident, accident_type, \
                             description, injuries_reported, damage_details";

/// `ClaimStore` backed by the `claims` and `images` tables
#[derive(Debug, Clone)]
pub struct PostgresClaimStore {
    pool: PgPool,
}

impl PostgresClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads the images of `claim_ids`, grouped by claim in id order
    async fn images_for(&self, claim_ids: &[i64]) -> Result<HashMap<i64, Vec<ClaimImage>>, DatabaseError> {
        if claim_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, ImageRow>(
            "SELECT id, claim_id, image_file FROM images WHERE claim_id = ANY($1) ORDER BY id",
        )
        .bind(claim_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<i64, Vec<ClaimImage>> = HashMap::new();
        for row in rows {
            grouped.entry(row.claim_id).or_default().push(row.into());
        }
        Ok(grouped)
    }
}

impl DomainPort for PostgresClaimStore {}

#[async_trait]
impl HealthCheckable for PostgresClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        super::ping(&self.pool, "postgres-claim-store").await
    }
}

#[async_trait]
impl ClaimStore for PostgresClaimStore {
    async fn begin(&self) -> Result<Box<dyn ClaimTransaction>, PortError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(Box::new(PgClaimTransaction { tx }))
    }

    #[instrument(skip(self), fields(user_id = %user_id, page = page.page()))]
    async fn list(&self, user_id: UserId, page: PageRequest) -> Result<Page<Claim>, PortError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM claims WHERE user_id = $1")
            .bind(user_id.value())
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        let rows = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE user_id = $1 ORDER BY id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id.value())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut images = self.images_for(&ids).await?;

        debug!(total, returned = rows.len(), "Listed claims");

        let items = rows
            .into_iter()
            .map(|row| {
                let attached = images.remove(&row.id).unwrap_or_default();
                row.into_claim(attached)
            })
            .collect();

        Ok(Page::new(items, total.max(0) as u64, page))
    }

    async fn get(&self, user_id: UserId, claim_id: ClaimId) -> Result<Option<Claim>, PortError> {
        let row = sqlx::query_as::<_, ClaimRow>(&format!(
            "SELECT {CLAIM_COLUMNS} FROM claims WHERE id = $1 AND user_id = $2"
        ))
        .bind(claim_id.value())
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut images = self.images_for(&[row.id]).await?;
        let attached = images.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_claim(attached)))
    }
}

/// An open PostgreSQL transaction
///
/// Dropping it without calling `commit` rolls the transaction back.
pub struct PgClaimTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ClaimTransaction for PgClaimTransaction {
    #[instrument(skip(self, claim), fields(user_id = %user_id))]
    async fn create(&mut self, user_id: UserId, claim: &NewClaim) -> Result<ClaimId, PortError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO claims (
                user_id, policy_number, date_of_accident, accident_type,
                description, injuries_reported, damage_details
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(user_id.value())
        .bind(&claim.policy_number)
        .bind(claim.date_of_accident)
        .bind(&claim.accident_type)
        .bind(&claim.description)
        .bind(claim.injuries_reported)
        .bind(&claim.damage_details)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(DatabaseError::from)?;

        Ok(ClaimId::new(id))
    }

    async fn attach_images(
        &mut self,
        claim_id: ClaimId,
        filenames: &[String],
    ) -> Result<Vec<ImageId>, PortError> {
        let mut ids = Vec::with_capacity(filenames.len());

        for filename in filenames {
            let id: i64 = sqlx::query_scalar(
                "INSERT INTO images (claim_id, image_file) VALUES ($1, $2) RETURNING id",
            )
            .bind(claim_id.value())
            .bind(filename)
            .fetch_one(&mut *self.tx)
            .await
            .map_err(DatabaseError::from)?;

            ids.push(ImageId::new(id));
        }

        Ok(ids)
    }

    async fn commit(self: Box<Self>) -> Result<(), PortError> {
        self.tx
            .commit()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PortError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DatabaseError::TransactionFailed(e.to_string()))?;
        Ok(())
    }
}
