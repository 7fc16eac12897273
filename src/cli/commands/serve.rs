use crate::{config, server};

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let config = config::config();
    server::run(config, port.unwrap_or(config.api.port)).await
}
