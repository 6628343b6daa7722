//! piket-server - household duty roster API
//!
//! Startup order: config file, tracing, root folder, database, router.

use anyhow::{Context, Result};
use clap::Parser;
use piket_common::config::{
    default_config_path, RootFolderInitializer, RootFolderResolver, ServerConfig,
};
use piket_server::db::init_database;
use piket_server::{build_router, AppState};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "piket-server", version, about = "Household duty roster API server")]
struct Args {
    /// Folder holding the database (overrides PIKET_ROOT_FOLDER and the config file)
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Path to the TOML config file
    #[arg(long, env = "PIKET_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(long, env = "PIKET_HOST")]
    host: Option<String>,

    /// Listen port
    #[arg(long, env = "PIKET_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match args.config.clone().or_else(default_config_path) {
        Some(path) => ServerConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting piket-server v{}", env!("CARGO_PKG_VERSION"));

    config.validate()?;

    let root_folder = RootFolderResolver::new()
        .with_cli_arg(args.root_folder)
        .with_config(&config)
        .resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;
    info!("Root folder: {}", initializer.root_folder().display());

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = init_database(&db_path, &config)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let bind_address = config.bind_address();
    let api_prefix = config.api_prefix.clone();
    let state = AppState::new(pool, config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("piket-server listening on http://{}{}", bind_address, api_prefix);
    info!("Health check: http://{}/health", bind_address);

    axum::serve(listener, app).await?;

    Ok(())
}
