//! Account and session routes

pub mod handler;

use crate::core::state::ServerState;
use axum::{
    Router,
    routing::{get, post, put},
};

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/logout", post(handler::logout))
        .route("/me", get(handler::me))
        .route("/profile", put(handler::update_profile))
        .route("/updatepassword", put(handler::update_password))
}
