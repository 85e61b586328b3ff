use pixpress_api::{init_telemetry, setup};
use pixpress_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    init_telemetry(config.environment())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let (_state, router) = setup::initialize_app(config.clone())?;

    setup::server::start_server(&config, router).await?;

    Ok(())
}
