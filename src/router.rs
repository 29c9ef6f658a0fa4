use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::AppState;

/// Build the application router with all routes
pub fn build(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(handlers::healthcheck))
        .route("/api/inventory", get(handlers::inventory::get_inventory))
        // Scorpion (router class) routes
        .route("/api/scorpions/:host/preview", get(handlers::scorpions::preview))
        .route("/api/scorpions/:host/current", get(handlers::scorpions::current))
        .route("/api/scorpions/defaults", post(handlers::scorpions::apply_defaults))
        .route("/api/scorpions/routes", post(handlers::scorpions::apply_routes))
        .route("/api/scorpions/trunks", post(handlers::scorpions::apply_trunks))
        // XIP3901 (gateway class) routes
        .route("/api/xips/:host/preview", get(handlers::xips::preview))
        .route("/api/xips/apply", post(handlers::xips::apply))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
