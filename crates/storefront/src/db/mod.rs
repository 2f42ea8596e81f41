//! `PostgreSQL` connection pool.
//!
//! The storefront keeps no domain data of its own; carts, orders and
//! customers live behind the backend services. The database holds only the
//! `tower_sessions.session` table (cart token, signed-in customer, recent
//! searches, queued toasts, pending payment).
//!
//! The table is created with:
//! ```bash
//! cargo run -p kivu-cli -- migrate
//! ```

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Sessions are small and short-lived; a handful of connections is enough.
const MAX_CONNECTIONS: u32 = 10;

/// Create a `PostgreSQL` connection pool.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url.expose_secret())
        .await
}

/// Readiness probe: a round trip to the database.
///
/// # Errors
///
/// Returns `sqlx::Error` if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}
