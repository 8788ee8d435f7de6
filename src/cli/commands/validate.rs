//! Configuration validation command.

use anyhow::Result;
use std::path::Path;
use traderd_config::load_config;

pub async fn run(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;

    println!("Configuration OK: {}", config_path.display());
    println!("  app:       {} ({})", config.app.name, config.app.environment);
    println!("  server:    {}:{}", config.server.host, config.server.port);
    println!("  gateway:   {} ({})", config.gateway.kind, config.gateway.bridge_url);
    println!("  timeframe: {}", config.trading.default_timeframe);
    println!("  symbols:   {}", config.trading.symbols.join(", "));

    Ok(())
}
