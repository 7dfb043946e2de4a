//! Order lifecycle engine
//!
//! Checkout, cancellation, payment and status transitions, including
//! the stock accounting that keeps the catalog consistent.

mod engine;

pub use engine::{OrderEngine, OrderError, Requester};

#[cfg(test)]
mod tests;
