//! `agentura init` — First-time setup.

use agentura_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("Agentura — First-Time Setup");
    println!("===========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("  Created data directory: {}", config_dir.display());
    } else {
        println!("  Data directory exists: {}", config_dir.display());
    }

    let sessions_dir = config_dir.join("sessions");
    if !sessions_dir.exists() {
        std::fs::create_dir_all(&sessions_dir)?;
        println!("  Created sessions directory: {}", sessions_dir.display());
    }

    if config_path.exists() {
        println!("\n  Config already exists at: {}", config_path.display());
        println!("  Edit it manually or delete and re-run init.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("  Created config.toml at: {}", config_path.display());
        println!("\n  Next steps:");
        println!("   1. Start Ollama, or set an API key for the openai provider");
        println!("   2. Run: agentura chat");
        println!("   3. Or serve the HTTP API: agentura gateway\n");
    }

    Ok(())
}
