//! # Dashgate DB
//!
//! PostgreSQL pool initialization for the Dashgate API.
//!
//! Schema migrations live in the workspace root `migrations/` directory and are
//! embedded into the server binary, see `dashgate::state::init_app_state`.

use std::env;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

/// Initializes a PostgreSQL connection pool from `DATABASE_URL`.
///
/// `DATABASE_MAX_CONNECTIONS` caps the pool size (default 10).
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set or the database is unreachable. This is
/// called once at startup, where there is nothing sensible to fall back to.
pub async fn init_db_pool() -> sqlx::PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);

    tracing::info!(max_connections, "Connecting to database");

    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}

pub use sqlx::PgPool;
