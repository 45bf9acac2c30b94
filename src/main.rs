use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, build_router, shutdown_signal};
use clinic_core::{ClinicConfig, db};

/// Main entry point for the clinic backend
///
/// Loads `.env`, resolves configuration once, prepares the database and serves the
/// REST gateway until Ctrl-C.
///
/// # Environment Variables
/// - `CLINIC_REST_ADDR`: Server address (default: "0.0.0.0:8000")
/// - `DATABASE_URL`: sqlite connection string (default: "sqlite://clinic.db")
/// - `SECRET_KEY`, `ALGORITHM`, `ACCESS_TOKEN_EXPIRE_MINUTES`: token signing
/// - `DEBUG`: enables Swagger UI and debug logging (default: true)
/// - `RUST_LOG`: overrides the log filter
///
/// # Errors
/// Returns an error if:
/// - the configuration is invalid,
/// - the database cannot be opened or its schema created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cfg = Arc::new(ClinicConfig::from_env()?);

    let level = if cfg.debug() { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("clinic={level}").parse()?)
                .add_directive(format!("api_rest={level}").parse()?)
                .add_directive(format!("tower_http={level}").parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if cfg.uses_default_secret() {
        tracing::warn!("SECRET_KEY is the built-in default; set it before deploying");
    }
    if cfg.users().is_empty() {
        tracing::warn!("CLINIC_USERS is empty; every login will be rejected");
    }

    let pool = db::connect(cfg.database_url()).await?;
    db::ensure_schema(&pool).await?;

    let addr = cfg.rest_addr().to_string();
    let app = build_router(AppState::from_config(cfg.clone(), pool))?;

    tracing::info!("++ Starting {} REST on {}", cfg.app_name(), addr);
    if cfg.debug() {
        tracing::info!("Swagger UI at http://{}/swagger-ui", addr);
    }

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Server stopped");
    Ok(())
}
