// ============================================
// File: crates/vpnrelay-server/src/main.rs
// ============================================
//! # vpnrelay Server Entry Point
//!
//! ## Creation Reason
//! Command-line front end for the relay configuration.
//!
//! ## Usage
//! ```bash
//! vpnrelay-server validate --config /etc/vpnrelay/relay.toml
//! vpnrelay-server defaults > relay.toml
//! ```
//!
//! ## Last Modified
//! v0.1.0 - Initial CLI implementation

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vpnrelay_server::RelayConfig;

// ============================================
// CLI Definition
// ============================================

/// vpnrelay tunnel server
#[derive(Parser, Debug)]
#[command(name = "vpnrelay-server")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate configuration file
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "/etc/vpnrelay/relay.toml")]
        config: PathBuf,
    },

    /// Print the default configuration
    Defaults,
}

// ============================================
// Main
// ============================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { config } => cmd_validate(config).await,
        Commands::Defaults => {
            init_logging("info");
            cmd_defaults();
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

// ============================================
// Commands
// ============================================

/// Loads and validates a configuration file.
async fn cmd_validate(config_path: PathBuf) -> anyhow::Result<()> {
    let loaded = RelayConfig::load(&config_path).await;
    let config = match loaded {
        Ok(config) => {
            init_logging(&config.logging.level);
            config
        }
        Err(e) => {
            init_logging("info");
            return Err(e.into());
        }
    };
    info!(path = %config_path.display(), level = %config.logging.level, "Configuration loaded");

    println!("✅ Configuration is valid");
    println!();
    println!("Session:");
    println!("   Inbound Queue:     {}", config.session.inbound_queue_capacity);
    println!(
        "   Credential Check:  {}s",
        config.session.credential_check_interval_secs
    );
    println!(
        "   Reply On All:      {}",
        config.session.reply_on_all_violations
    );
    println!();
    println!("Router:");
    println!("   Outbound Queue:    {}", config.router.outbound_queue_capacity);
    println!();
    println!("Logging:");
    println!("   Level:             {}", config.logging.level);
    println!();

    Ok(())
}

/// Prints the default configuration as TOML.
fn cmd_defaults() {
    print!("{}", RelayConfig::default().to_toml());
}

// ============================================
// Helpers
// ============================================

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()
        .ok();
}
