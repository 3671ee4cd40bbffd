//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::models::AppConfig;
use crate::services::BlendService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub blend_service: Arc<BlendService>,
}

/// Create application state from a loaded configuration.
pub fn create_app_state(config: AppConfig) -> AppState {
    let blend_service = Arc::new(BlendService::new(&config));
    tracing::debug!(
        boundary = config.boundary_mode().as_str(),
        solver = config.solver_kind().as_str(),
        parallel = config.blend.parallel,
        max_pixels = config.server.max_pixels,
        "Application state created"
    );

    AppState {
        config: Arc::new(config),
        blend_service,
    }
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.max_body_bytes;

    Router::new()
        .route("/api/blend", post(handle_blend))
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

// Wrapper handler to extract the service for the underlying API handler

async fn handle_blend(
    axum::extract::State(state): axum::extract::State<AppState>,
    body: axum::Json<api::BlendRequest>,
) -> Result<axum::response::Response, crate::error::ApiError> {
    api::handle_blend(axum::extract::State(state.blend_service), body).await
}
