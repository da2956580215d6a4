//! Router assembly, shared application state, and server startup.

use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::refresh::{self, Cache};
use crate::store::{ContentStore, FileNode, GithubStore, SharedStore, StoreError};

use super::files;
use super::tracker;
use super::types::HealthResponse;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: SharedStore,
    /// Cached tracker document text, keyed by path.
    pub tracker: Cache<String>,
    /// Cached directory listings, keyed by path.
    pub listings: Cache<Vec<FileNode>>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn ContentStore>) -> Self {
        let ttl = config.refresh_interval;
        Self {
            config,
            store,
            tracker: Cache::new(ttl),
            listings: Cache::new(ttl),
        }
    }

    /// Current tracker document text, from cache when fresh.
    pub async fn tracker_text(&self) -> Result<String, StoreError> {
        let path = &self.config.tracker_path;
        if let Some(text) = self.tracker.fresh(path).await {
            return Ok(text);
        }
        let generation = self.tracker.begin_fetch();
        let text = self.store.file_content(path).await?;
        self.tracker.store(path, text.clone(), generation).await;
        Ok(text)
    }

    /// Directory listing, from cache when fresh.
    pub async fn listing(&self, path: &str) -> Result<Vec<FileNode>, StoreError> {
        if let Some(entries) = self.listings.fresh(path).await {
            return Ok(entries);
        }
        let generation = self.listings.begin_fetch();
        let entries = self.store.list_dir(path).await?;
        self.listings
            .store(path, entries.clone(), generation)
            .await;
        Ok(entries)
    }
}

/// Build the application router over the given state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/files", get(files::get_files))
        .route("/api/files", post(files::post_files))
        .route("/api/tracker/tasks", get(tracker::tasks))
        .route("/api/tracker/board", get(tracker::board))
        .route("/api/tracker/critical-path", get(tracker::critical_path))
        .route("/api/tracker/next-actions", get(tracker::next_actions))
        .route("/api/tracker/milestones", get(tracker::milestones))
        .route("/api/tracker/summary", get(tracker::summary))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store: SharedStore = Arc::new(GithubStore::new(
        config.github_token.clone(),
        config.repo_owner.clone(),
        config.repo_name.clone(),
    ));
    let state = Arc::new(AppState::new(config, store));

    // Background re-poll of the tracker and open listings.
    refresh::spawn(Arc::clone(&state));

    let app = router(Arc::clone(&state));

    let addr = format!("{}:{}", state.config.host, state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for SIGTERM/SIGINT.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        repo: state.config.repo_slug(),
        tracker_path: state.config.tracker_path.clone(),
    })
}
