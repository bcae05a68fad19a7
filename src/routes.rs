//! Route definitions for the oracle server API

use axum::http::{header, HeaderValue, Method};
use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::api_status;

pub fn api_routes() -> Router {
    Router::new().route("/api", get(api_status))
}

/// The full HTTP application served by the binary.
pub fn app() -> Router {
    api_routes()
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer())
}

fn build_cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:8000".to_string())
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(false)
}
