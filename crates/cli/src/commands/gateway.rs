//! `agentura gateway` — Start the HTTP API server.

use agentura_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    let model = config
        .active_provider()
        .map(|p| p.model.clone())
        .unwrap_or_default();

    println!("Agentura Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Provider:  {} ({model})", config.default_provider);
    println!("   Sessions:  {}", config.sessions.backend);

    agentura_gateway::start(config).await?;

    Ok(())
}
