use anyhow::Context;

use crate::config;
use crate::database::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    let database = &config::config().database;
    let pool = DatabaseManager::connect(database).await.context("connecting to database")?;
    DatabaseManager::migrate(&pool).await.context("running migrations")?;
    println!("Migrations applied");
    Ok(())
}
