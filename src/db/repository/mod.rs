//! Data access layer
//!
//! Each repository wraps the shared SurrealDB handle and owns the
//! queries for one table.

pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use category::CategoryRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use surrealdb::{RecordId, Surreal, engine::local::Db};
use thiserror::Error;

/// Repository errors
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let msg = err.to_string();
        // Unique index violations surface as generic errors; classify them
        // so callers can map to a 400 instead of a 500.
        if msg.contains("already contains") || msg.contains("unique") {
            RepoError::Duplicate(msg)
        } else {
            RepoError::Database(msg)
        }
    }
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository holding the database connection
#[derive(Debug, Clone)]
pub struct BaseRepository {
    pub db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }
}

/// Parse a reference like `product:abc` into a RecordId, falling back
/// to treating the whole input as a key in `table`.
pub fn parse_record_id(table: &str, reference: &str) -> RecordId {
    match reference.parse::<RecordId>() {
        Ok(id) if id.table() == table => id,
        _ => RecordId::from_table_key(table, reference),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_id_full_form() {
        let id = parse_record_id("product", "product:abc123");
        assert_eq!(id.table(), "product");
        assert_eq!(id.to_string(), "product:abc123");
    }

    #[test]
    fn test_parse_record_id_bare_key() {
        let id = parse_record_id("product", "abc123");
        assert_eq!(id.table(), "product");
        assert_eq!(id.to_string(), "product:abc123");
    }

    #[test]
    fn test_parse_record_id_wrong_table_falls_back() {
        let id = parse_record_id("product", "user:abc123");
        assert_eq!(id.table(), "product");
    }
}
