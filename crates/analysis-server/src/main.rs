//! Chess Analysis Server
//!
//! Serves position evaluation and move analysis over HTTP, backed by a single
//! Stockfish process.

use std::path::PathBuf;

use analysis_server::config::{AppConfig, CONFIG_FILE};
use analysis_server::middleware::SlowRequestThreshold;
use analysis_server::{app, AppState, DEFAULT_LOG_FILTER};
use anyhow::Context;
use chess_analysis::{AnalysisConfig, Analyzer, StockfishSession};
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Chess Analysis Server - HTTP API in front of a UCI engine.
#[derive(Parser)]
#[command(name = "analysis-server")]
#[command(about = "Serves chess position and move analysis over HTTP")]
struct Args {
    /// Path to the config file (default: search for analysis.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Path to the engine executable
    #[arg(long)]
    engine: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();
    let args = Args::parse();

    let (mut config, source) = AppConfig::load(args.config.as_deref())?;
    match source {
        Some(path) => tracing::info!("Config: {}", path.display()),
        None => tracing::info!("No {} found, using defaults", CONFIG_FILE),
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(engine) = args.engine {
        config.engine.path = engine;
    }

    let engine_config = config.engine.clone();
    let session = tokio::task::spawn_blocking(move || StockfishSession::spawn(&engine_config))
        .await?
        .with_context(|| format!("Failed to start engine '{}'", config.engine.path))?;

    let analyzer = Analyzer::new(
        Box::new(session),
        AnalysisConfig {
            depth: config.engine.depth,
            max_search_time_ms: config.server.max_time_to_analyze_ms,
        },
    );
    let state = AppState::new(analyzer, &config.server);
    let app = app(state, SlowRequestThreshold(config.server.slow_request()));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    tracing::info!("Server running on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
