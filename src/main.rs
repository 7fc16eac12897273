use agileboard_api::{config, is_production, server};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    server::init_tracing();

    let config = config::config();
    info!("Starting AgileBoard API in {:?} mode", config.environment);
    if is_production!() && config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL is required in production");
    }

    server::run(config, config.api.port).await
}
