//! PostgreSQL stores for the domain ports
//!
//! Each store holds a pool handle, issues runtime-checked SQL and converts
//! rows into domain types before they leave the crate.

pub mod users;
pub mod claims;

pub use users::PostgresUserStore;
pub use claims::{PgClaimTransaction, PostgresClaimStore};

use std::time::Instant;

use core_kernel::HealthCheckResult;
use sqlx::PgPool;

/// Round-trips `SELECT 1` and reports the latency
pub(crate) async fn ping(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = Instant::now();

    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(_) => HealthCheckResult::healthy(adapter_id, latency_ms),
        Err(e) => HealthCheckResult::unhealthy(adapter_id, latency_ms, format!("Database error: {e}")),
    }
}
