//! thiamsu-web: crowd-sourced Taiwanese lyric translation site
//!
//! Configuration comes from, in priority order, command-line arguments,
//! environment variables, `~/.config/thiamsu/thiamsu-web.toml` and compiled
//! defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use thiamsu_common::config::{CompiledDefaults, RootFolderInitializer, RootFolderResolver};
use thiamsu_common::db::init_database;
use thiamsu_web::{build_router, AppState};
use tokio::signal;
use tracing::info;

const MODULE_NAME: &str = "thiamsu-web";

#[derive(Parser, Debug)]
#[command(name = "thiamsu-web")]
#[command(about = "Crowd-sourced lyric translation site")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "THIAMSU_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "THIAMSU_BIND")]
    bind: Option<String>,

    /// Root folder holding the database
    #[arg(short, long, env = "THIAMSU_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let resolver = RootFolderResolver::new(MODULE_NAME).with_cli_override(args.root_folder);
    let toml_config = resolver.load_toml();
    let defaults = CompiledDefaults::for_current_platform();

    let default_filter = format!(
        "thiamsu_web={level},thiamsu_common={level},tower_http={level}",
        level = toml_config.logging.level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    info!(
        "Starting thiamsu-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolver.resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to create root folder")?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to initialize database")?;

    let site = toml_config.site.clone();
    info!(
        "Page size {}, translation max length {}",
        site.page_size, site.translation_max_length
    );

    let state = AppState::new(pool, site);
    let app = build_router(state);

    let bind = args
        .bind
        .or(toml_config.bind_address)
        .unwrap_or(defaults.bind_address);
    let port = args.port.or(toml_config.port).unwrap_or(defaults.port);
    let addr = format!("{}:{}", bind, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("thiamsu-web listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
