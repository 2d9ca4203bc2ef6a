//! Test harness with testcontainers for integration testing.
//!
//! A single MySQL container is shared across all tests in a binary. The
//! container starts and the schema is applied once, on first use.

use std::time::Duration;

use anyhow::{Context, Result};
use estudiantes_core::config::DatabaseConfig;
use estudiantes_core::kernel::Database;
use estudiantes_core::server::build_app;
use sqlx::MySqlPool;
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mysql::Mysql;
use tokio::sync::OnceCell;

use super::ApiClient;

const SCHEMA: &str = include_str!("../../sql/estudiantes.sql");

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    server_url: String,
    db_url: String,
    // Keep container alive for the entire test run
    _mysql: ContainerAsync<Mysql>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let mysql = Mysql::default()
            .start()
            .await
            .context("Failed to start MySQL container")?;

        let host = mysql.get_host().await?;
        let port = mysql.get_host_port_ipv4(3306).await?;
        let server_url = format!("mysql://root@{}:{}", host, port);
        let db_url = format!("{}/test", server_url);

        let pool = MySqlPool::connect(&db_url)
            .await
            .context("Failed to connect to MySQL for schema setup")?;

        sqlx::query(SCHEMA)
            .execute(&pool)
            .await
            .context("Failed to create estudiantes table")?;

        Ok(Self {
            server_url,
            db_url,
            _mysql: mysql,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Initialize a tracing subscriber that respects RUST_LOG.
///
/// Run tests with: RUST_LOG=debug cargo test -- --nocapture
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Test harness backed by the shared MySQL container.
///
/// Each test gets its own pool and router; the table is shared, so tests
/// must only make assertions about rows they created themselves.
pub struct TestHarness {
    /// Database pool - use this for fixtures and direct assertions.
    pub db_pool: MySqlPool,
    client: ApiClient,
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let db_pool = MySqlPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        let client = ApiClient::new(build_app(Database::from_pool(db_pool.clone())));

        Ok(Self { db_pool, client })
    }

    /// Harness on its own database whose `estudiantes` table uses `schema`.
    ///
    /// Both statements are idempotent, so tests may share a database name.
    pub async fn with_schema(database: &str, schema: &str) -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        let admin = MySqlPool::connect(&infra.server_url)
            .await
            .context("Failed to connect to MySQL server")?;
        sqlx::query(&format!("CREATE DATABASE IF NOT EXISTS `{}`", database))
            .execute(&admin)
            .await
            .context("Failed to create test database")?;

        let db_pool = MySqlPool::connect(&format!("{}/{}", infra.server_url, database))
            .await
            .context("Failed to connect to test database")?;
        sqlx::query(schema)
            .execute(&db_pool)
            .await
            .context("Failed to create estudiantes table")?;

        let client = ApiClient::new(build_app(Database::from_pool(db_pool.clone())));

        Ok(Self { db_pool, client })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

/// A client whose database can never be reached.
pub fn unreachable_database_client() -> ApiClient {
    init_tracing();

    let config = DatabaseConfig {
        host: "127.0.0.1".to_string(),
        // tcpmux; closed on any sane test host
        port: 1,
        user: "nadie".to_string(),
        password: Some("incorrecta".to_string()),
        name: Some("universidad".to_string()),
        max_connections: 2,
        acquire_timeout: Duration::from_secs(1),
    };

    ApiClient::new(build_app(Database::connect_lazy(&config)))
}
