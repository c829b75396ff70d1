//! HTTP server command
//!
//! Opens the SQLite database, makes sure the users table exists, and serves
//! the /users API until Ctrl+C or SIGTERM.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use userctl_server::db::{create_pool_with_options, ensure_schema, DEFAULT_MAX_CONNECTIONS};
use userctl_server::http::{run_server, NotFoundPolicy, ServerConfig};
use userctl_server::SqliteUserStore;

use super::DEFAULT_DATABASE_URL;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "USERCTL_BIND", default_value = "127.0.0.1:8000")]
    pub bind: SocketAddr,

    /// Database URL (sqlite://path or sqlite::memory:)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Maximum pooled database connections
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Answer GET with null and PUT with an echo for ids that have no row
    #[arg(long)]
    pub compat_not_found: bool,
}

impl ServeArgs {
    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind,
            cors_permissive: self.cors_permissive,
            request_timeout: Duration::from_secs(self.timeout),
            not_found: if self.compat_not_found {
                NotFoundPolicy::Compat
            } else {
                NotFoundPolicy::Strict
            },
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    tracing::info!("Starting userctl server on {}", args.bind);
    tracing::info!(database = %args.database_url, "Opening database");

    let pool = create_pool_with_options(&args.database_url, args.max_connections)
        .await
        .context("Failed to create database pool")?;

    ensure_schema(&pool)
        .await
        .context("Failed to create users table")?;

    let store = Arc::new(SqliteUserStore::new(pool));

    // Blocks until shutdown
    run_server(store, args.server_config())
        .await
        .context("Server error")?;

    Ok(())
}
