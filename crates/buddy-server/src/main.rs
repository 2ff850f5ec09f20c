//! Budget Buddy server binary
//!
//! Usage:
//!   buddy-server --db buddy.db --port 3000
//!
//! Required environment:
//!   BUDDY_SECRET          Session token signing secret
//!
//! Optional environment:
//!   PERPLEXITY_API_KEY    Enables the AI advisor endpoints
//!   RUST_LOG              Log filter (overrides --verbose)

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use buddy_core::Database;
use buddy_server::{serve, ServerConfig};

#[derive(Parser)]
#[command(name = "buddy-server", about = "Budget Buddy expense tracker API")]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, default_value = "buddy.db")]
    db: String,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Comma-separated list of allowed CORS origins
    #[arg(long)]
    allowed_origins: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let secret = std::env::var("BUDDY_SECRET")
        .context("BUDDY_SECRET must be set (session token signing secret)")?;

    let mut config = ServerConfig::new(&secret);
    if let Some(origins) = cli.allowed_origins {
        config.allowed_origins = origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
    }

    let db = Database::new(&cli.db)?;

    serve(db, &cli.host, cli.port, config).await
}
