//! itemctl CLI - items REST API server and database probe
//!
//! - `serve`: run the HTTP API plus the background health monitor
//! - `ping`: probe the configured backend once
//!
//! Settings come from flags, then environment variables, then `.env` in the
//! working directory.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "itemctl",
    author,
    version,
    about = "REST API for a single items table over Postgres or a hosted PostgREST endpoint"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence when set)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API and the database health monitor
    Serve(commands::serve::ServeArgs),
    /// Probe the configured database once and report latency
    Ping(commands::ping::PingArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Before parsing, so clap's env fallbacks see .env values
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&tracing_setup::TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::Ping(args) => commands::run_ping(args).await?,
    }
    Ok(())
}
