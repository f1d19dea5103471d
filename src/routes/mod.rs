//! Route definitions for the Stockwatch inventory API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Product catalog
        .route("/products", post(handlers::create_product))
        // Low-stock alerts
        .route(
            "/companies/:company_id/alerts/low-stock",
            get(handlers::get_low_stock_alerts),
        )
}
