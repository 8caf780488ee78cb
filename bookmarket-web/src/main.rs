//! Bookmarket Web Server
//!
//! A small second-hand book marketplace.

use anyhow::Context;
use bookmarket_core::{init_logging, AppConfig};
use bookmarket_web::server::BookmarketServerBuilder;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

/// Bookmarket Web Server - buy and sell second-hand books
#[derive(Parser)]
#[command(name = "bookmarket-web")]
#[command(about = "A web marketplace for second-hand books")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to bookmarket.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// Database URL, e.g. sqlite:data/bookmarket.db
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load environment variables before reading configuration
    dotenvy::dotenv().ok();

    let config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let mut logging = config.logging.clone();
    if let Some(level) = &args.log_level {
        logging = logging.with_level(level);
    }
    init_logging(&logging).map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let mut builder = BookmarketServerBuilder::new(config);
    if let Some(host) = args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }
    if args.dev {
        builder = builder.dev_mode(true);
    }
    if let Some(database_url) = args.database_url {
        builder = builder.database_url(database_url);
    }

    let server = builder.build().await.context("Failed to build server")?;

    let config = server.config();
    info!("Database: {}", config.database.url);
    if config.session.uses_default_secret() && config.server.dev_mode {
        warn!("Development mode with the built-in session secret");
    }

    server.start().await.context("Server failed")?;
    Ok(())
}
