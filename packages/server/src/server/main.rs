// Main entry point for the student records API

use anyhow::{Context, Result};
use estudiantes_core::kernel::Database;
use estudiantes_core::{server::build_app, Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,estudiantes_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Student Records API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let password_status = if config.database.password.is_some() {
        "****"
    } else {
        "NOT SET"
    };
    tracing::info!(
        db_host = %config.database.host,
        db_port = config.database.port,
        db_user = %config.database.user,
        db_name = config.database.name.as_deref().unwrap_or("(none)"),
        db_password = password_status,
        "Configuration loaded"
    );

    // Connections are opened on demand by the first request that needs one
    let db = Database::connect_lazy(&config.database);

    let app = build_app(db);

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
