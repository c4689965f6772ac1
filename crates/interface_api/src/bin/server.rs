//! Claims Intake - API Server Binary
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin claims-api
//!
//! API_PORT=8080 DATABASE_URL=postgres://... API_STORAGE_URL=https://xyz.supabase.co \
//!     API_STORAGE_KEY=... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` / `API_PORT` - Listen address (default: 0.0.0.0:5328)
//! * `DATABASE_URL` or `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_DB_MAX_CONNECTIONS` / `API_DB_CONNECT_TIMEOUT_SECS` - Pool size and
//!   connection wait (default: 10 connections, 10s)
//! * `API_JWT_SECRET` - Token signing secret (required in production)
//! * `API_ACCESS_TOKEN_TTL_SECS` / `API_REFRESH_TOKEN_TTL_SECS` - Token lifetimes
//! * `API_STORAGE_URL` / `API_STORAGE_KEY` / `API_STORAGE_BUCKET` - Image bucket;
//!   without a URL images are kept in memory
//! * `API_CORS_ORIGINS` - Comma separated origins, `*` for any
//! * `API_MAX_UPLOAD_BYTES` - Request body limit
//! * `API_LOG_LEVEL` - trace, debug, info, warn, error (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use domain_claims::ObjectStore;
use infra_db::{create_pool, run_migrations, PostgresClaimStore, PostgresUserStore};
use infra_storage::{InMemoryObjectStore, SupabaseConfig, SupabaseStorage};
use interface_api::{config::ApiConfig, create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ApiConfig::from_env().context("invalid API configuration")?;

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        bucket = %config.storage_bucket,
        "Starting claims intake API"
    );

    let pool = create_pool(config.database())
        .await
        .context("failed to connect to the database")?;
    run_migrations(&pool).await.context("failed to apply migrations")?;

    let objects = object_store(&config)?;
    let state = AppState::new(
        config.clone(),
        Arc::new(PostgresUserStore::new(pool.clone())),
        Arc::new(PostgresClaimStore::new(pool)),
        objects,
    );

    let addr: SocketAddr = config
        .server_addr()
        .parse()
        .with_context(|| format!("invalid listen address {}", config.server_addr()))?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Supabase when a storage URL is configured, process memory otherwise
fn object_store(config: &ApiConfig) -> anyhow::Result<Arc<dyn ObjectStore>> {
    if !config.uses_remote_storage() {
        tracing::warn!("No storage URL configured, claim images are kept in memory");
        return Ok(Arc::new(InMemoryObjectStore::new()));
    }

    let storage = SupabaseStorage::new(SupabaseConfig::new(&config.storage_url, &config.storage_key))
        .context("failed to build the storage client")?;
    Ok(Arc::new(storage))
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
