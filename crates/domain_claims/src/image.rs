//! Image references attached to a claim

use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ImageId};

/// An uploaded image, referenced by its object key in the bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimImage {
    pub id: ImageId,
    pub claim_id: ClaimId,
    /// Object key (the sanitized upload filename)
    pub image_file: String,
}
