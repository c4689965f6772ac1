//! Auth handlers

use axum::{extract::rejection::JsonRejection, extract::State, Extension, Json};
use tracing::info;

use domain_account::Credentials;

use crate::dto::auth::*;
use crate::middleware::AuthUser;
use crate::{error::ApiError, AppState};

/// Creates an account and opens a session
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Json(request) = payload?;

    let user = state
        .accounts
        .register(Credentials::new(request.email, request.password))
        .await?;

    Ok(Json(SessionResponse {
        message: "User created successfully".to_string(),
        access_token: state.tokens.issue_access(user.id)?,
        refresh_token: state.tokens.issue_refresh(user.id)?,
    }))
}

/// Exchanges credentials for a session
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, ApiError> {
    let Json(request) = payload?;

    let user = state.accounts.verify(&request.email, &request.password).await?;
    info!(user_id = %user.id, "User logged in");

    Ok(Json(SessionResponse {
        message: "Logged in successfully".to_string(),
        access_token: state.tokens.issue_access(user.id)?,
        refresh_token: state.tokens.issue_refresh(user.id)?,
    }))
}

/// Mints a new access token from a refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    Ok(Json(AccessTokenResponse {
        access_token: state.tokens.issue_access(auth.user_id)?,
    }))
}

/// Returns the caller's email
pub async fn whoami(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<WhoAmIResponse>, ApiError> {
    let user = state.accounts.find(auth.user_id).await?;
    Ok(Json(WhoAmIResponse { email: user.email }))
}
