use anyhow::Result;
use idlink_core::{config::Config, server, telemetry};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let telemetry = telemetry::init(&config.telemetry)?;

    info!("Starting Idlink Core Service");
    info!(config = ?config, "Configuration loaded");

    let result = server::run(config, telemetry.prometheus.clone()).await;
    telemetry.shutdown();
    result
}
