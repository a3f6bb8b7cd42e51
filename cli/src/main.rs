//! Fuel calculator HTTP server
//!
//! ```sh
//! # Default config (~/.config/fuel-calculator/config.toml or $FUEL_CALCULATOR_CONFIG)
//! fuel-calculator
//!
//! # Custom config and port
//! fuel-calculator --config /etc/fuel-calculator/config.toml --port 9090
//!
//! # Validate config without starting
//! fuel-calculator --check
//!
//! # Credentials for the config file
//! fuel-calculator hash-password 's3cret'
//! fuel-calculator generate-api-key "Fleet reports"
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use fuel_calculator::config::AppConfig;
use fuel_calculator::infrastructure::crypto::api_key::generate_api_key;
use fuel_calculator::infrastructure::crypto::password::hash_password;
use fuel_calculator::server::{init_tracing, ServerHandle, ServerOptions};

#[derive(Parser, Debug)]
#[command(
    name = "fuel-calculator",
    version,
    about = "Fuel consumption and cost calculator service"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    /// Defaults to $FUEL_CALCULATOR_CONFIG, then the per-user config dir.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration file and exit.
    #[arg(long)]
    check: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a bcrypt hash for `[[security.users]]`.
    HashPassword { password: String },
    /// Generate an API key and the hash for `[[security.api_keys]]`.
    GenerateApiKey { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::HashPassword { password }) => {
            println!("{}", hash_password(&password)?);
            return Ok(());
        }
        Some(Command::GenerateApiKey { name }) => {
            let generated = generate_api_key(&name);
            println!("key      = {}", generated.key);
            println!("key_hash = {}", generated.key_hash);
            println!();
            println!("Store the key now; only its hash goes in the config file.");
            return Ok(());
        }
        None => {}
    }

    let config_path = cli.config.unwrap_or_else(fuel_calculator::resolve_config_path);

    // A config that fails to parse or validate is fatal; a missing one means defaults
    let mut config = AppConfig::load(&config_path)?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    if cli.check {
        let defaults = config.calculator.defaults();
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Address     : {}", config.server.address());
        println!("   Log level   : {} ({})", config.logging.level, config.logging.format);
        println!("   Users       : {}", config.security.users.len());
        println!("   API keys    : {}", config.security.api_keys.len());
        println!(
            "   Defaults    : distance={} consumption={} price={}",
            defaults.default_distance, defaults.default_fuel_consumption, defaults.default_fuel_price
        );
        return Ok(());
    }

    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    let handle = ServerHandle::start(ServerOptions {
        config,
        config_path: Some(config_path),
    })
    .await?;

    handle.install_signal_handler();
    info!("Press Ctrl+C to shut down gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}
