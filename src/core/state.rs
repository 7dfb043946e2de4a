//! Shared server state

use crate::auth::jwt::{JwtConfig, JwtService};
use crate::core::config::Config;
use crate::db;
use anyhow::Result;
use std::sync::Arc;
use surrealdb::{Surreal, engine::local::Db};

/// State shared across every handler. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub db: Surreal<Db>,
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// Open the database, install the schema, bootstrap the admin
    /// account and build the shared state.
    pub async fn initialize(config: Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let db = db::open(&config.data_dir).await?;

        if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
            db::bootstrap_admin(&db, email, password).await?;
        }

        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Ok(Self {
            config: Arc::new(config),
            db,
            jwt_service,
        })
    }

    /// In-memory state for tests
    pub async fn for_tests() -> Result<Self> {
        let db = db::open_in_memory().await?;
        let config = Config {
            data_dir: String::new(),
            http_port: 0,
            environment: "development".to_string(),
            jwt: JwtConfig {
                secret: "test-secret-key-at-least-32-characters!!".to_string(),
                expiration_minutes: 60,
                issuer: "storefront-server".to_string(),
                audience: "storefront-clients".to_string(),
            },
            admin_email: None,
            admin_password: None,
        };
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Ok(Self {
            config: Arc::new(config),
            db,
            jwt_service,
        })
    }
}
