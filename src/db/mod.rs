//! Embedded database service
//!
//! Opens the SurrealDB instance (RocksDB on disk, memory for tests) and
//! installs the schema: unique indexes, lookup indexes and the
//! full-text analyzer behind catalog search.

pub mod models;
pub mod repository;

use crate::db::models::user::{Role, User, UserCreate};
use crate::db::repository::UserRepository;
use anyhow::{Context, Result};
use surrealdb::{
    Surreal,
    engine::local::{Db, Mem, RocksDb},
};

const NAMESPACE: &str = "storefront";
const DATABASE: &str = "storefront";

/// Open the persistent database under `data_dir` and install the schema
pub async fn open(data_dir: &str) -> Result<Surreal<Db>> {
    let path = std::path::Path::new(data_dir).join("storefront.db");
    let db = Surreal::new::<RocksDb>(path)
        .await
        .context("failed to open database")?;
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .context("failed to select namespace")?;
    init_schema(&db).await?;
    Ok(db)
}

/// Open an in-memory database with the same schema (tests)
pub async fn open_in_memory() -> Result<Surreal<Db>> {
    let db = Surreal::new::<Mem>(())
        .await
        .context("failed to open in-memory database")?;
    db.use_ns(NAMESPACE)
        .use_db(DATABASE)
        .await
        .context("failed to select namespace")?;
    init_schema(&db).await?;
    Ok(db)
}

async fn init_schema(db: &Surreal<Db>) -> Result<()> {
    db.query(
        "
        DEFINE INDEX IF NOT EXISTS idx_user_email ON TABLE user COLUMNS email UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_category_name ON TABLE category COLUMNS name UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_category_slug ON TABLE category COLUMNS slug UNIQUE;

        DEFINE INDEX IF NOT EXISTS idx_product_category ON TABLE product COLUMNS category;
        DEFINE INDEX IF NOT EXISTS idx_order_user ON TABLE orders COLUMNS user;

        DEFINE ANALYZER IF NOT EXISTS product_text TOKENIZERS class FILTERS lowercase, ascii;
        DEFINE INDEX IF NOT EXISTS idx_product_name_search ON TABLE product
            COLUMNS name SEARCH ANALYZER product_text BM25;
        DEFINE INDEX IF NOT EXISTS idx_product_description_search ON TABLE product
            COLUMNS description SEARCH ANALYZER product_text BM25;
        DEFINE INDEX IF NOT EXISTS idx_product_tags_search ON TABLE product
            COLUMNS tags SEARCH ANALYZER product_text BM25;
        ",
    )
    .await
    .context("failed to initialize database schema")?;
    Ok(())
}

/// Ensure the configured admin account exists. Runs once at startup and
/// is a no-op when the email is already registered.
pub async fn bootstrap_admin(db: &Surreal<Db>, email: &str, password: &str) -> Result<()> {
    let users = UserRepository::new(db.clone());

    if let Some(existing) = users
        .find_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("admin lookup failed: {}", e))?
    {
        tracing::debug!(email = %existing.email, "admin account already present");
        return Ok(());
    }

    let admin: User = users
        .create(UserCreate {
            name: "Administrator".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role: Some(Role::Admin),
        })
        .await
        .map_err(|e| anyhow::anyhow!("admin bootstrap failed: {}", e))?;
    tracing::info!(email = %admin.email, "bootstrapped admin account");
    Ok(())
}
