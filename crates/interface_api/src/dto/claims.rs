//! Claims DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::ImageId;
use domain_claims::Claim;

/// Query string of the claim listing
///
/// Values stay strings so a malformed number falls back to the default
/// instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListClaimsQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl ListClaimsQuery {
    pub fn page(&self) -> Option<i64> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }

    pub fn per_page(&self) -> Option<i64> {
        self.per_page.as_deref().and_then(|p| p.trim().parse().ok())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimResponse {
    pub id: i64,
    pub user_id: i64,
    /// Id of the submitting user
    pub author: i64,
    pub policy_number: String,
    pub date_of_accident: DateTime<Utc>,
    pub accident_type: String,
    pub description: String,
    pub injuries_reported: bool,
    pub damage_details: String,
    /// Image ids in upload order
    pub images: Vec<i64>,
}

impl ClaimResponse {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            id: claim.id.value(),
            user_id: claim.user_id.value(),
            author: claim.user_id.value(),
            policy_number: claim.policy_number.clone(),
            date_of_accident: claim.date_of_accident,
            accident_type: claim.accident_type.clone(),
            description: claim.description.clone(),
            injuries_reported: claim.injuries_reported,
            damage_details: claim.damage_details.clone(),
            images: claim.image_ids().into_iter().map(ImageId::value).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateClaimResponse {
    pub message: String,
    pub claim_id: i64,
    /// Fresh access token for the submitting user
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimListResponse {
    pub claims: Vec<ClaimResponse>,
    pub total: u64,
    pub pages: u64,
    pub current_page: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClaimDetailResponse {
    pub claim: ClaimResponse,
    /// Public URLs of the claim images
    pub images: Vec<String>,
}
