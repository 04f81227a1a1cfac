//! # Reelshelf Server
//!
//! Serves a media root over HTTP. Watch progress and probed durations are
//! cached in a flat metadata file that is rewritten on a debounced schedule
//! and flushed once more on shutdown.

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::Parser;
use reelshelf_core::{FfprobeDurationProbe, MediaLibrary, MetadataStore};
use reelshelf_server::{
    AppState, create_app,
    infra::config::{Config, ConfigLoad, ConfigLoader},
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "reelshelf-server")]
#[command(about = "Media folder browser with cached durations and watch progress")]
struct Cli {
    /// Path to a reelshelf.toml file
    #[arg(short, long, env = "REELSHELF_CONFIG")]
    config: Option<PathBuf>,

    /// Path to a .env file (defaults to ./.env when present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Media root directory (overrides config)
    #[arg(long, env = "MEDIA_ROOT")]
    media_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config.clone() {
        loader = loader.with_config_path(path);
    }
    if let Some(path) = cli.env_file.clone() {
        loader = loader.with_env_file(path);
    }
    let ConfigLoad {
        mut config,
        warnings,
    } = loader.load().context("failed to load configuration")?;

    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(root) = cli.media_root {
        config.media.root = root;
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if config.sources.env_file_loaded {
        info!("loaded .env file");
    }
    if let Some(path) = &config.sources.config_path {
        info!(path = %path.display(), "configuration file loaded");
    }
    for warning in &warnings.items {
        match &warning.hint {
            Some(hint) => {
                warn!(message = %warning.message, hint = %hint, "configuration warning")
            }
            None => warn!(message = %warning.message, "configuration warning"),
        }
    }

    run_server(config).await
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    if !config.media.root.is_dir() {
        bail!(
            "media root {} does not exist or is not a directory",
            config.media.root.display()
        );
    }

    let store = Arc::new(
        MetadataStore::open(&config.metadata.path, config.metadata.flush_policy())
            .with_context(|| {
                format!(
                    "failed to read metadata snapshot {}",
                    config.metadata.path.display()
                )
            })?,
    );
    let probe = Arc::new(FfprobeDurationProbe::new(&config.ffprobe.path));
    let library = Arc::new(MediaLibrary::new(
        config.media.root.clone(),
        store,
        probe,
        config.durations.concurrency,
    ));

    let app = create_app(AppState::new(library.clone()));

    let listener =
        tokio::net::TcpListener::bind((config.server.host.as_str(), config.server.port))
            .await
            .with_context(|| {
                format!(
                    "failed to bind {}:{}",
                    config.server.host, config.server.port
                )
            })?;
    info!(
        "Starting reelshelf on {}:{} serving {}",
        config.server.host,
        config.server.port,
        config.media.root.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("flushing metadata before exit");
    library.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
