//! Gold Loan API Server
//!
//! # Usage
//! ```bash
//! goldloan                              # defaults + env vars
//! goldloan --config goldloan.toml       # TOML file, env vars vẫn ghi đè
//! goldloan --config goldloan.toml --check
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use goldloan_api::{create_router, AppConfig, AppState};
use goldloan_persistence::Database;

/// Gold loan backend - idempotent loan lifecycle API
#[derive(Parser, Debug)]
#[command(name = "goldloan")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Validate configuration and exit
    #[arg(long)]
    check: bool,

    /// Log level (trace, debug, info, warn, error); mặc định lấy từ config
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(args.config.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    init_logging(args.log_level.as_deref().unwrap_or(&config.log_level));

    tracing::info!("{} v{}", config.app_name, env!("CARGO_PKG_VERSION"));

    if args.check {
        tracing::info!("Configuration is valid");
        return Ok(());
    }

    let db = Database::connect(&config.database_url, config.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    let state = AppState::new(&db, &config);
    let app = create_router(state, &config.api_prefix);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("API server listening at http://{}{}", addr, config.api_prefix);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
