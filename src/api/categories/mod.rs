//! Category routes
//!
//! Reads are public; writes are stacked behind the admin gate.

pub mod handler;

use crate::auth::middleware::require_admin;
use crate::core::state::ServerState;
use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

pub fn router() -> Router<ServerState> {
    let public = Router::new()
        .route("/", get(handler::list_categories))
        .route("/{id}", get(handler::get_category));

    let admin = Router::new()
        .route("/", post(handler::create_category))
        .route("/{id}", put(handler::update_category))
        .route("/{id}", delete(handler::delete_category))
        .layer(middleware::from_fn(require_admin));

    public.merge(admin)
}
