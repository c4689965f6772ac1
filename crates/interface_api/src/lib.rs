//! HTTP API Layer
//!
//! This crate provides the REST API of the claims intake backend using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: account sessions, claim submission and listing, health
//! - **Middleware**: bearer token checks and audit logging
//! - **DTOs**: Request/Response bodies
//! - **Error Handling**: every failure is returned as `{"error": ...}`
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let state = AppState::new(config, user_store, claim_store, object_store);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use domain_account::{CredentialService, UserStore};
use domain_claims::{ClaimIntakeService, ClaimStore, ObjectStore};

use crate::auth::TokenIssuer;
use crate::config::ApiConfig;
use crate::handlers::{auth as auth_handlers, claims, health};
use crate::middleware::{audit_middleware, require_access, require_refresh};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub accounts: CredentialService,
    pub claims: ClaimIntakeService,
    pub tokens: TokenIssuer,
}

impl AppState {
    /// Wires the services over the given adapters
    pub fn new(
        config: ApiConfig,
        users: Arc<dyn UserStore>,
        claims: Arc<dyn ClaimStore>,
        objects: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            accounts: CredentialService::new(users),
            claims: ClaimIntakeService::new(claims, objects, config.storage_bucket.clone()),
            tokens: TokenIssuer::from_config(&config),
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/api/auth/register", post(auth_handlers::register))
        .route("/api/auth/login", post(auth_handlers::login));

    let refresh_routes = Router::new()
        .route("/api/auth/refresh", post(auth_handlers::refresh))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_refresh));

    // Layers run bottom-up: the token check happens before the audit entry
    let protected_routes = Router::new()
        .route("/api/auth/whoami", get(auth_handlers::whoami))
        .route("/api/claims", post(claims::create_claim).get(claims::list_claims))
        .route("/api/claims/:id", get(claims::get_claim))
        .route_layer(axum_middleware::from_fn(audit_middleware))
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_access));

    Router::new()
        .merge(public_routes)
        .merge(refresh_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config)),
        )
        .with_state(state)
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match config.allowed_origins() {
        None => layer.allow_origin(Any),
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(AllowOrigin::list(origins))
        }
    }
}
