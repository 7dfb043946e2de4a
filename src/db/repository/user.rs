//! User repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::user::{ProfileUpdate, Role, User, UserCreate};
use chrono::Utc;
use surrealdb::{Surreal, engine::local::Db};

#[derive(Debug, Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Register a new account. Emails are normalized to lowercase and
    /// must be unique.
    pub async fn create(&self, data: UserCreate) -> RepoResult<User> {
        let email = data.email.trim().to_lowercase();

        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "email already registered: {}",
                email
            )));
        }

        let password_hash = User::hash_password(&data.password)
            .map_err(|e| RepoError::Database(format!("password hashing failed: {}", e)))?;

        let now = Utc::now();
        let user = User {
            id: None,
            name: data.name,
            email,
            password_hash,
            role: data.role.unwrap_or(Role::Customer),
            phone: None,
            address: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created: Option<User> = self.base.db.create("user").content(user).await?;
        created.ok_or_else(|| RepoError::Database("failed to create user".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let mut result = self
            .base
            .db
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Look up a user by reference (`user:key` or bare key)
    pub async fn find_by_id(&self, user_ref: &str) -> RepoResult<Option<User>> {
        let id = parse_record_id("user", user_ref);
        let user: Option<User> = self.base.db.select(id).await?;
        Ok(user)
    }

    /// Apply a partial profile update and return the refreshed record
    pub async fn update_profile(&self, user_ref: &str, data: ProfileUpdate) -> RepoResult<User> {
        let id = parse_record_id("user", user_ref);

        let mut merge = serde_json::Map::new();
        if let Some(name) = data.name {
            merge.insert("name".to_string(), serde_json::json!(name));
        }
        if let Some(phone) = data.phone {
            merge.insert("phone".to_string(), serde_json::json!(phone));
        }
        if let Some(address) = data.address {
            merge.insert("address".to_string(), serde_json::json!(address));
        }
        merge.insert("updated_at".to_string(), serde_json::json!(Utc::now()));

        let mut result = self
            .base
            .db
            .query("UPDATE $id MERGE $data RETURN AFTER")
            .bind(("id", id))
            .bind(("data", serde_json::Value::Object(merge)))
            .await?;
        let users: Vec<User> = result.take(0)?;
        users
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("user not found: {}", user_ref)))
    }

    /// Replace the stored password hash
    pub async fn set_password_hash(&self, user_ref: &str, password_hash: String) -> RepoResult<()> {
        let id = parse_record_id("user", user_ref);
        let mut result = self
            .base
            .db
            .query("UPDATE $id SET password_hash = $hash, updated_at = $now RETURN AFTER")
            .bind(("id", id))
            .bind(("hash", password_hash))
            .bind(("now", Utc::now()))
            .await?;
        let users: Vec<User> = result.take(0)?;
        if users.is_empty() {
            return Err(RepoError::NotFound(format!("user not found: {}", user_ref)));
        }
        Ok(())
    }
}
