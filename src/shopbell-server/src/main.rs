//! Shopbell Server - HTTP server binary.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use shopbell_server::config::StorageBackendKind;
use shopbell_server::{ServerConfig, run_with_shutdown};

/// Shopbell Server
#[derive(Parser)]
#[command(name = "shopbell-server")]
#[command(about = "Posts a Slack message for every new store order")]
#[command(version)]
struct Args {
    /// Configuration file path (JSON)
    #[arg(short, long, env = "SHOPBELL_CONFIG")]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(short, long)]
    listen: Option<String>,

    /// Settings backend (memory or file)
    #[arg(long)]
    storage: Option<StorageBackendKind>,

    /// Data directory for the file backend
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => ServerConfig::from_env().context("Failed to load config from environment")?,
        };

        if let Some(listen) = &self.listen {
            config.listen_addr = listen.clone();
        }
        if let Some(storage) = self.storage {
            config.storage.backend = storage;
        }
        if let Some(dir) = &self.data_dir {
            config.storage.data_dir = dir.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if self.json_logs {
            config.logging.format = "json".to_string();
        }

        Ok(config)
    }
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = args.load_config();

    match &config {
        Ok(c) => setup_logging(&c.logging.level, c.logging.is_json()),
        Err(_) => setup_logging(args.log_level.as_deref().unwrap_or("info"), args.json_logs),
    }

    let config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        listen_addr = %config.listen_addr,
        storage = ?config.storage.backend,
        shutdown_timeout_secs = config.shutdown_timeout,
        "Configuration loaded"
    );

    if let Err(e) = run_with_shutdown(config, shutdown_signal()).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
