//! Order routes
//!
//! Everything here requires a session; the full listing and status
//! transitions are admin-only.

pub mod handler;

use crate::auth::middleware::require_admin;
use crate::core::state::ServerState;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};

pub fn router() -> Router<ServerState> {
    let user = Router::new()
        .route("/", post(handler::create_order))
        .route("/myorders", get(handler::my_orders))
        .route("/{id}", get(handler::get_order))
        .route("/{id}/pay", put(handler::pay_order))
        .route("/{id}/cancel", put(handler::cancel_order));

    let admin = Router::new()
        .route("/", get(handler::list_orders))
        .route("/{id}/status", put(handler::update_status))
        .layer(middleware::from_fn(require_admin));

    user.merge(admin)
}
