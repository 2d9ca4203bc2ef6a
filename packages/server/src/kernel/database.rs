//! Database adapter.
//!
//! Hands out one pooled MySQL connection per request. The pool connects
//! lazily, so a misconfigured or unreachable database never blocks startup;
//! it only shows up as a failed acquisition on the request that needs it.

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::pool::PoolConnection;
use sqlx::MySql;

use crate::config::DatabaseConfig;

/// Shared handle to the student database.
#[derive(Clone, Debug)]
pub struct Database {
    pool: MySqlPool,
}

impl Database {
    /// Create the adapter without opening any connection yet.
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(config.connect_options());

        Self { pool }
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Acquire a connection for the duration of one request.
    ///
    /// Driver failures are logged and reported as `None`. The connection is
    /// returned to the pool when dropped.
    pub async fn acquire_connection(&self) -> Option<PoolConnection<MySql>> {
        match self.pool.acquire().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                tracing::error!(error = %e, "Error connecting to MySQL");
                None
            }
        }
    }
}
