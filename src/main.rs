//! Hostel Finder Backend
//!
//! REST backend for the student hostel directory: listings with filters,
//! seat booking requests, and admin decisions on those requests.

mod api;
mod config;
mod db;
mod errors;
mod filter;
mod models;
mod reservation;

use std::sync::Arc;

use axum::{
    routing::{get, put},
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
    pub repo: Arc<dyn Repository>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Hostel Finder Backend");
    tracing::info!("Storage backend: {}", config.storage.as_str());
    tracing::info!("Bind address: {}", config.bind_addr);

    let repo = db::open_repository(&config).await?;
    let hostels = repo.list_hostels().await?;
    tracing::info!(
        "Repository ready ({}) with {} hostels",
        repo.backend_name(),
        hostels.len()
    );

    let state = AppState { repo };

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

    let api_routes = Router::new()
        // Hostels
        .route("/hostels", get(api::list_hostels).post(api::create_hostel))
        .route(
            "/hostels/{id}",
            get(api::get_hostel)
                .put(api::update_hostel)
                .delete(api::delete_hostel),
        )
        // Bookings
        .route("/bookings", get(api::list_bookings).post(api::create_booking))
        .route("/bookings/{id}", get(api::get_booking))
        .route("/bookings/{id}/status", put(api::update_booking_status));

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
