//! Product routes
//!
//! Catalog reads are public, reviews need a session, catalog writes are
//! admin-only.

pub mod handler;

use crate::auth::middleware::require_admin;
use crate::core::state::ServerState;
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

pub fn router() -> Router<ServerState> {
    let public = Router::new()
        .route("/", get(handler::list_products))
        .route("/featured", get(handler::featured_products))
        .route("/{id}", get(handler::get_product))
        .route("/{id}/reviews", post(handler::add_review));

    let admin = Router::new()
        .route("/", post(handler::create_product))
        .route("/{id}", put(handler::update_product))
        .route("/{id}", delete(handler::delete_product))
        .layer(middleware::from_fn(require_admin));

    public.merge(admin)
}
