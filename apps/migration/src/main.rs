//! Migration CLI tool.
//!
//! Reads `DATABASE_URL` (a `.env` file is honoured) and accepts the usual
//! `up`, `down`, `status`, `fresh` and `refresh` subcommands.

use sea_orm_migration::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Running yatube migrations");
    cli::run_cli(migration::Migrator).await;
}
