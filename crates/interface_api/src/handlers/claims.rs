//! Claims handlers

use std::str::FromStr;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::{debug, info};

use core_kernel::{ClaimId, PageRequest};
use domain_claims::{validate_files, ClaimForm, UploadedFile};

use crate::dto::claims::*;
use crate::middleware::AuthUser;
use crate::{error::ApiError, AppState};

/// Submits a claim with its images
///
/// Text fields are validated before the files, and nothing is written
/// unless both pass.
pub async fn create_claim(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreateClaimResponse>), ApiError> {
    let user = state.accounts.find(auth.user_id).await?;

    let (form, files) = read_submission(multipart).await?;
    let claim = form.parse()?;
    let files = validate_files(files)?;

    let submitted = state.claims.submit(user.id, claim, files).await?;
    info!(claim_id = %submitted.claim_id, user_id = %user.id, "Claim created");

    Ok((
        StatusCode::CREATED,
        Json(CreateClaimResponse {
            message: "Claim created successfully".to_string(),
            claim_id: submitted.claim_id.value(),
            access_token: state.tokens.issue_access(user.id)?,
        }),
    ))
}

/// Lists the caller's claims, newest first
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Json<ClaimListResponse>, ApiError> {
    let user = state.accounts.find(auth.user_id).await?;
    let request = PageRequest::new(query.page(), query.per_page());

    let page = state
        .claims
        .list(user.id, request)
        .await?
        .map(|claim| ClaimResponse::from_claim(&claim));
    let pages = page.pages();

    Ok(Json(ClaimListResponse {
        claims: page.items,
        total: page.total,
        pages,
        current_page: page.page,
    }))
}

/// Gets one of the caller's claims with its image URLs
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ClaimDetailResponse>, ApiError> {
    let claim_id = ClaimId::from_str(&id).map_err(|_| ApiError::NotFound("Claim not found".to_string()))?;
    let user = state.accounts.find(auth.user_id).await?;

    let claim = state.claims.get(user.id, claim_id).await?;

    Ok(Json(ClaimDetailResponse {
        images: state.claims.image_urls(&claim),
        claim: ClaimResponse::from_claim(&claim),
    }))
}

/// Splits a multipart body into text fields and file parts
///
/// A part with a filename (even an empty one) is a file; every other part
/// is a text field.
async fn read_submission(mut multipart: Multipart) -> Result<(ClaimForm, Vec<UploadedFile>), ApiError> {
    let mut form = ClaimForm::new();
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(filename) => {
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(multipart_error)?;
                debug!(field = %name, filename = %filename, size = bytes.len(), "Received file part");
                files.push(UploadedFile::new(name, filename, content_type, bytes));
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(multipart_error)?;
                form.insert(name, value);
            }
        }
    }

    Ok((form, files))
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(e.body_text())
    }
}
