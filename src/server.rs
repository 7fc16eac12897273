//! Process startup shared by the `agileboard-api` binary and `agileboard serve`.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::auth::TokenService;
use crate::config::{AppConfig, DatabaseConfig};
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};
use crate::handlers::AppState;

const DEFAULT_LOG_FILTER: &str = "agileboard_api=info,tower_http=info";
const QUIET_LOG_FILTER: &str = "agileboard_api=info,tower_http=warn";

/// `RUST_LOG` wins over the default filter. Per-request spans are only
/// emitted when request logging is enabled in the config.
pub fn init_tracing() {
    let default = if crate::config::config().api.enable_request_logging {
        DEFAULT_LOG_FILTER
    } else {
        QUIET_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // a second init (tests, CLI re-entry) is harmless
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// PostgreSQL when a URL is configured, otherwise the in-memory store.
pub async fn open_store(config: &DatabaseConfig) -> anyhow::Result<Arc<dyn Store>> {
    if config.url.is_none() {
        warn!("DATABASE_URL not set; using the in-memory store, data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let pool = DatabaseManager::connect(config).await.context("connecting to database")?;
    DatabaseManager::health_check(&pool).await.context("database health check")?;
    if config.run_migrations {
        DatabaseManager::migrate(&pool).await.context("running migrations")?;
    }
    Ok(Arc::new(PgStore::new(pool)))
}

/// Builds the router over the configured store and serves until shutdown.
pub async fn run(config: &AppConfig, port: u16) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let store = open_store(&config.database).await?;
    let backend = store.backend();
    let state = AppState::new(store, TokenService::from_config(&config.security));
    let app = crate::app(state, &config.security.cors_origins);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!(%bind_addr, store = backend, environment = ?config.environment, "AgileBoard API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
