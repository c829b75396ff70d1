//! userctl CLI - user record service
//!
//! - `serve`: run the HTTP API over a SQLite database
//! - `init-db`: create the database file and users table

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "userctl",
    author,
    version,
    about = "Create, read, replace, and delete user records over HTTP"
)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Create the database and users table, then exit
    InitDb(commands::init_db::InitDbArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env in the working directory, if present, before clap reads env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let tracing_config = tracing_setup::TracingConfig { debug: cli.debug };
    tracing_setup::init(&tracing_config).ok();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await?,
        Commands::InitDb(args) => commands::run_init_db(args).await?,
    }

    Ok(())
}
