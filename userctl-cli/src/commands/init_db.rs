//! Create the database file and users table without starting the server

use anyhow::{Context, Result};
use clap::Parser;

use userctl_server::db::{create_pool, ensure_schema};

use super::DEFAULT_DATABASE_URL;

/// Arguments for the init-db command
#[derive(Parser, Debug)]
pub struct InitDbArgs {
    /// Database URL (sqlite://path)
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,
}

pub async fn run_init_db(args: InitDbArgs) -> Result<()> {
    let pool = create_pool(&args.database_url)
        .await
        .with_context(|| format!("Failed to open {}", args.database_url))?;

    ensure_schema(&pool)
        .await
        .context("Failed to create users table")?;

    pool.close().await;

    tracing::info!(database = %args.database_url, "users table ready");
    println!("Initialized {}", args.database_url);
    Ok(())
}
