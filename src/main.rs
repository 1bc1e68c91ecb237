//! SidingOps Backend
//!
//! REST backend for the SidingOps contractor operations dashboard, with
//! SQLite persistence and built-in backup & restore.

mod api;
mod backup;
mod config;
mod db;
mod errors;
mod models;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use backup::BackupService;
use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub backups: BackupService,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting SidingOps Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Repository::new(pool);

    // Backup subsystem shares the repository
    let backups = BackupService::new(repo.clone(), config.backup_history_limit);

    // Create application state
    let state = AppState {
        repo: Arc::new(repo),
        backups,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Clients
        .route("/clients", get(api::list_clients))
        .route("/clients", post(api::create_client))
        .route("/clients/{id}", get(api::get_client))
        .route("/clients/{id}", put(api::update_client))
        .route("/clients/{id}", delete(api::delete_client))
        // Projects
        .route("/projects", get(api::list_projects))
        .route("/projects", post(api::create_project))
        .route("/projects/{id}", get(api::get_project))
        .route("/projects/{id}", put(api::update_project))
        .route("/projects/{id}", delete(api::delete_project))
        // Teams
        .route("/teams", get(api::list_teams))
        .route("/teams", post(api::create_team))
        .route("/teams/{id}", get(api::get_team))
        .route("/teams/{id}", put(api::update_team))
        .route("/teams/{id}", delete(api::delete_team))
        // Quotes
        .route("/quotes", get(api::list_quotes))
        .route("/quotes", post(api::create_quote))
        .route("/quotes/{id}", get(api::get_quote))
        .route("/quotes/{id}", put(api::update_quote))
        .route("/quotes/{id}", delete(api::delete_quote))
        // Company settings
        .route("/settings", get(api::get_settings))
        .route("/settings", put(api::save_settings))
        // Dashboard
        .route("/dashboard", get(api::get_dashboard))
        // Backups
        .route("/backups", get(api::list_backups))
        .route("/backups", post(api::create_backup))
        .route("/backups/restore", post(api::restore_upload))
        .route("/backups/{id}", delete(api::delete_backup))
        .route("/backups/{id}/download", get(api::download_backup))
        .route("/backups/{id}/restore", post(api::restore_backup));

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
