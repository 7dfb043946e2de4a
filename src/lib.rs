//! Storefront server
//!
//! REST backend for a small e-commerce storefront: account and session
//! management, a product catalog with categories and reviews, and an
//! order lifecycle engine, all backed by an embedded SurrealDB store.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod orders;
pub mod utils;

pub use auth::jwt::JwtService;
pub use auth::middleware::CurrentUser;
pub use core::config::Config;
pub use core::server::Server;
pub use core::state::ServerState;
pub use utils::error::{AppError, AppResult};
pub use utils::logger::{init_logger, init_logger_with_file};
