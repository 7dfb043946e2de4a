//! HTTP API surface
//!
//! Per-resource routers nested under `/api`, wrapped in the shared
//! middleware stack (auth, request ids, tracing, compression, CORS).

pub mod auth;
pub mod categories;
pub mod convert;
pub mod health;
pub mod orders;
pub mod products;

use crate::auth::middleware::require_auth;
use crate::core::state::ServerState;
use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::IntoResponse,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Assemble the route tree
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .nest("/api/auth", auth::router())
        .nest("/api/categories", categories::router())
        .nest("/api/products", products::router())
        .nest("/api/orders", orders::router())
        .fallback(not_found)
}

/// Route tree plus the middleware stack, ready to serve
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "success": false,
            "message": "Route not found",
        })),
    )
}
