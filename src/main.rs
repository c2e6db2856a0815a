use simulator_registry::app_config::AppConfig;
use simulator_registry::applesimutils::AppleSimUtils;
use simulator_registry::device_registry::DeviceRegistry;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Arc::new(AppConfig::load()?);
    tracing_subscriber::fmt().with_max_level(config.core().log_level()?).init();

    info!("🪵 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    info!("✅  Loaded configuration");

    let controller = Arc::new(AppleSimUtils::new(config.clone()));
    let registry = DeviceRegistry::new(controller);
    info!("✅  Initialized device registry");

    let udid = registry.acquire_device(config.device_query().clone()).await?;
    info!(udid = udid, "🔥 Acquired device for '{}'", config.device_query());

    println!("{}", udid);

    Ok(())
}
