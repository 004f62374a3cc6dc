//! Back-Office Backend
//!
//! A REST backend for the administrative back office: menu management,
//! authority-to-menu mapping, code-group lookups, and configuration-backed
//! variables, over SQLite persistence.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod menu;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
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

    tracing::info!("Starting Back-Office Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (ADMIN_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
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

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Navigation
        .route("/menus", get(api::get_menu_tree))
        // Menu administration
        .route("/admin/menus", get(api::list_menus))
        .route("/admin/menus", post(api::create_menu))
        .route("/admin/menus/{id}", get(api::get_menu))
        .route("/admin/menus/{id}", put(api::update_menu))
        .route("/admin/menus/{id}", delete(api::delete_menu))
        // Authority-to-menu mapping
        .route("/admin/menus/authority/{authority}", get(api::get_authority_menus))
        .route("/admin/menus/authority/{authority}", put(api::save_authority_menus))
        .route(
            "/admin/menus/authority/{authority}",
            delete(api::delete_authority_menus),
        )
        // Code groups
        .route("/admin/code-groups", get(api::list_code_groups))
        .route("/admin/code-groups", post(api::create_code_group))
        .route("/admin/code-groups/{code_group}", put(api::update_code_group))
        .route(
            "/admin/code-groups/{code_group}",
            delete(api::delete_code_group),
        )
        // Codes
        .route("/codes/{code_group}", get(api::lookup_codes))
        .route("/admin/codes/{code_group}", get(api::list_codes))
        .route("/admin/codes", post(api::create_code))
        .route("/admin/codes/{code_group}/{code}", put(api::update_code))
        .route("/admin/codes/{code_group}/{code}", delete(api::delete_code))
        // Variables
        .route("/variables/title", get(api::get_app_title))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

    // Health check (no auth required)
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
