use apparel_gateway::{logger, server, GatewayConfig};

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_loaded = dotenv::dotenv().is_ok();

    logger::init_with_config(logger::LoggerConfig::from_env()?)?;

    if env_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    let config = GatewayConfig::from_env()?;
    logger::log_config_info(&config);

    if let Err(e) = config.validate() {
        log::error!("❌ {}", e);
        return Err(e.into());
    }

    logger::log_startup_info(
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        config.port,
    );

    server::run(config).await?;
    Ok(())
}
