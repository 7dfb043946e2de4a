//! Server configuration
//!
//! All knobs come from the environment (a `.env` file is loaded in
//! `main` before this runs).

use crate::auth::jwt::JwtConfig;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the embedded database and logs
    pub data_dir: String,
    /// HTTP listen port
    pub http_port: u16,
    /// `development` | `production`
    pub environment: String,
    /// JWT signing configuration
    pub jwt: JwtConfig,
    /// Admin account bootstrapped at startup when both are set
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            jwt: JwtConfig::default(),
            admin_email: std::env::var("ADMIN_EMAIL").ok(),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        !self.is_production()
    }
}
