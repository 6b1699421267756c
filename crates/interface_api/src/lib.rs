//! HTTP API Layer
//!
//! This crate exposes the claim evaluation engine over REST using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Health check and claim evaluation endpoints
//! - **Middleware**: Request ids, tracing and request logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use domain_claims::InferenceEngine;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{claims, health};
use crate::middleware::{request_logging, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `config` - API configuration
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(config: ApiConfig) -> Router {
    let engine = Arc::new(InferenceEngine::new(config.engine_config()));
    let state = AppState { engine, config };

    let claims_routes = Router::new()
        .route("/evaluate", post(claims::evaluate_claim))
        .route("/evaluate/batch", post(claims::evaluate_batch));

    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .layer(axum_middleware::from_fn(request_logging));

    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    // Later layers wrap earlier ones, so the request id is set before tracing sees it
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api/v1", api_routes)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
