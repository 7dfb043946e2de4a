//! Shared Utilities
//!
//! - [`error`] - unified error type and response envelope
//! - [`logger`] - tracing subscriber setup
//! - [`slug`] - URL slug derivation

pub mod error;
pub mod logger;
pub mod slug;

pub use error::{AppError, AppResult};
