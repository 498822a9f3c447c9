//! Bogga - personal to-do lists with shareable links

use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bogga::{config::Args, db::TaskDb, server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("bogga={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Bogga v{}", env!("CARGO_PKG_VERSION"));
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Database: {}", args.database_path);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("Session lifetime: {}s", args.jwt_expiry_seconds);
    info!("PIN salt: {}", if args.pin_salt.is_some() { "configured" } else { "none" });
    info!("======================================");

    let db = if args.is_memory_database() {
        TaskDb::open_in_memory()?
    } else {
        TaskDb::open(Path::new(&args.database_path))?
    };

    let state = Arc::new(AppState::new(args, db)?);
    server::run(state).await?;

    Ok(())
}
