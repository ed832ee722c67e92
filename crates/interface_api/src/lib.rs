//! HTTP API Layer
//!
//! This crate provides the REST API for the balance dashboard using Axum.
//! The layer is deliberately thin: handlers validate input into typed
//! criteria and delegate to `domain_metrics::DashboardService`; no
//! aggregation logic lives here.
//!
//! # Architecture
//!
//! - **Handlers**: dashboard, entity drill-downs, export, health
//! - **DTOs**: query-parameter parsing and response shaping
//! - **Error Handling**: RFC 7807 problem responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, config::ApiConfig};
//!
//! let app = create_router(service, ApiConfig::default());
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_metrics::DashboardService;

use crate::config::ApiConfig;
use crate::handlers::{dashboard, entities, export, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: DashboardService,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `service` - The metrics engine facade (already wired to its stores)
/// * `config` - API configuration
pub fn create_router(service: DashboardService, config: ApiConfig) -> Router {
    let state = AppState { service, config };

    // Public routes (no state-dependent middleware)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Dashboard and drill-down routes
    let dashboard_routes = Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/clients/:id", get(entities::get_client))
        .route("/funds/:name", get(entities::get_fund))
        .route("/accounts/:id", get(entities::get_account));

    // Export routes
    let export_routes = Router::new()
        .route("/count", get(export::row_count))
        .route("/rows", get(export::rows));

    let api_routes = Router::new()
        .merge(dashboard_routes)
        .nest("/export", export_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
