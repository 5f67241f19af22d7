//! Chess Analysis Server Library
//!
//! HTTP front end for [`chess_analysis`]: routing, request and response
//! bodies, error mapping, configuration and request timing.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use chess_analysis::Analyzer;
use tower_http::cors::{Any, CorsLayer};

use config::ServerConfig;
use middleware::{timing_layer, SlowRequestThreshold};

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "analysis_server=info,chess_analysis=info";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The analyzer owning the engine session.
    pub analyzer: Arc<Analyzer>,
    /// Deadline for one analysis call.
    pub request_timeout: Duration,
    pub robots_path: Arc<PathBuf>,
    pub license_path: Arc<PathBuf>,
}

impl AppState {
    pub fn new(analyzer: Analyzer, config: &ServerConfig) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
            request_timeout: config.request_timeout(),
            robots_path: Arc::new(config.robots_path.clone()),
            license_path: Arc::new(config.license_path.clone()),
        }
    }
}

/// Builds the application router.
pub fn app(state: AppState, slow_request: SlowRequestThreshold) -> Router {
    // CORS layer for cross-origin requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::analysis::opening_moves))
        .route("/evaluate-position", post(api::analysis::evaluate_position))
        .route("/analyze-move", post(api::analysis::analyze_move))
        .route("/robots.txt", get(api::static_text::robots))
        .route("/about", get(api::static_text::about))
        .route("/health", get(api::static_text::health))
        .with_state(state)
        .layer(from_fn_with_state(slow_request, timing_layer))
        .layer(cors)
}
