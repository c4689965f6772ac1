//! Claim intake service
//!
//! Orchestrates a submission across the relational store and the object
//! store, and serves the read side (listing and detail).

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use core_kernel::{ClaimId, ImageId, Page, PageRequest, UserId};

use crate::claim::{Claim, NewClaim};
use crate::error::ClaimError;
use crate::ports::{ClaimStore, ClaimTransaction, ObjectStore};
use crate::upload::UploadedFile;

/// Content type recorded for uploads that declared none
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedClaim {
    pub claim_id: ClaimId,
    pub image_ids: Vec<ImageId>,
    /// Object keys (`{claim id}/{file name}`), in the same order as `image_ids`
    pub object_keys: Vec<String>,
}

#[derive(Clone)]
pub struct ClaimIntakeService {
    store: Arc<dyn ClaimStore>,
    objects: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ClaimIntakeService {
    pub fn new(store: Arc<dyn ClaimStore>, objects: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            objects,
            bucket: bucket.into(),
        }
    }

    /// Persists a claim with its images
    ///
    /// `files` must already have passed [`validate_files`](crate::upload::validate_files).
    /// The claim row and the image rows commit together; if any upload fails
    /// the transaction is rolled back and `ClaimError::Storage` is returned.
    /// Objects are keyed under the new claim id, so equal filenames from
    /// different claims never meet in the bucket.
    #[instrument(skip(self, claim, files), fields(files = files.len()))]
    pub async fn submit(
        &self,
        user_id: UserId,
        claim: NewClaim,
        files: Vec<UploadedFile>,
    ) -> Result<SubmittedClaim, ClaimError> {
        let mut tx = self.store.begin().await?;

        let claim_id = match tx.create(user_id, &claim).await {
            Ok(id) => id,
            Err(e) => {
                abandon(tx).await;
                return Err(e.into());
            }
        };

        let mut taken = HashSet::with_capacity(files.len());
        let mut object_keys = Vec::with_capacity(files.len());
        for file in files {
            let key = format!("{}/{}", claim_id.value(), unique_name(file.object_key(), &mut taken));
            let content_type = file.mime_essence().unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());

            if let Err(e) = self
                .objects
                .upload(&self.bucket, &key, &content_type, file.bytes)
                .await
            {
                error!(%claim_id, key = %key, error = %e, "Image upload failed, rolling back claim");
                abandon(tx).await;
                return Err(ClaimError::Storage(e.to_string()));
            }
            object_keys.push(key);
        }

        let image_ids = match tx.attach_images(claim_id, &object_keys).await {
            Ok(ids) => ids,
            Err(e) => {
                abandon(tx).await;
                return Err(e.into());
            }
        };

        tx.commit().await?;

        info!(%claim_id, images = image_ids.len(), "Claim submitted");
        Ok(SubmittedClaim {
            claim_id,
            image_ids,
            object_keys,
        })
    }

    /// One page of the user's claims, newest first
    pub async fn list(&self, user_id: UserId, page: PageRequest) -> Result<Page<Claim>, ClaimError> {
        Ok(self.store.list(user_id, page).await?)
    }

    /// A claim owned by the user
    pub async fn get(&self, user_id: UserId, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        self.store
            .get(user_id, claim_id)
            .await?
            .ok_or_else(|| ClaimError::ClaimNotFound(claim_id.to_string()))
    }

    /// Public URLs of the claim's images, in upload order
    pub fn image_urls(&self, claim: &Claim) -> Vec<String> {
        claim
            .images
            .iter()
            .map(|image| self.objects.public_url(&self.bucket, &image.image_file))
            .collect()
    }

    /// Returns the underlying store, used by readiness checks
    pub fn store(&self) -> &Arc<dyn ClaimStore> {
        &self.store
    }
}

/// Returns `name`, or `stem-N.ext` with the lowest free N when a part with
/// the same name was already taken in this submission
fn unique_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, format!(".{ext}")),
        None => (name.as_str(), String::new()),
    };

    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Rolls back after a failed step; the original error is what the caller sees
async fn abandon(tx: Box<dyn ClaimTransaction>) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "Rollback failed");
    }
}
