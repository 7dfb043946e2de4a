//! Category repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::category::{Category, CategoryCreate, CategoryUpdate};
use crate::utils::slug::slugify;
use chrono::Utc;
use surrealdb::{Surreal, engine::local::Db};

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    base: BaseRepository,
}

impl CategoryRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// List active categories ordered by name
    pub async fn find_all(&self) -> RepoResult<Vec<Category>> {
        let mut result = self
            .base
            .db
            .query("SELECT * FROM category WHERE is_active = true ORDER BY name ASC")
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories)
    }

    pub async fn find_by_id(&self, category_ref: &str) -> RepoResult<Option<Category>> {
        let id = parse_record_id("category", category_ref);
        let category: Option<Category> = self.base.db.select(id).await?;
        Ok(category)
    }

    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Category>> {
        let name = name.trim().to_string();
        let mut result = self
            .base
            .db
            .query("SELECT * FROM category WHERE name = $name LIMIT 1")
            .bind(("name", name))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        Ok(categories.into_iter().next())
    }

    /// Create a category. Names are unique and the slug is derived from
    /// the name.
    pub async fn create(&self, data: CategoryCreate) -> RepoResult<Category> {
        let name = data.name.trim().to_string();

        if self.find_by_name(&name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "category already exists: {}",
                name
            )));
        }

        let now = Utc::now();
        let category = Category {
            id: None,
            slug: slugify(&name),
            name,
            description: data.description,
            image: data.image,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Category> = self.base.db.create("category").content(category).await?;
        created.ok_or_else(|| RepoError::Database("failed to create category".to_string()))
    }

    /// Apply a partial update. Renaming re-derives the slug and
    /// re-checks name uniqueness.
    pub async fn update(&self, category_ref: &str, data: CategoryUpdate) -> RepoResult<Category> {
        let existing = self
            .find_by_id(category_ref)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("category not found: {}", category_ref)))?;

        let mut merge = serde_json::Map::new();
        if let Some(name) = data.name {
            let name = name.trim().to_string();
            if name != existing.name {
                if self.find_by_name(&name).await?.is_some() {
                    return Err(RepoError::Duplicate(format!(
                        "category already exists: {}",
                        name
                    )));
                }
                merge.insert("slug".to_string(), serde_json::json!(slugify(&name)));
                merge.insert("name".to_string(), serde_json::json!(name));
            }
        }
        if let Some(description) = data.description {
            merge.insert("description".to_string(), serde_json::json!(description));
        }
        if let Some(image) = data.image {
            merge.insert("image".to_string(), serde_json::json!(image));
        }
        if let Some(is_active) = data.is_active {
            merge.insert("is_active".to_string(), serde_json::json!(is_active));
        }
        merge.insert("updated_at".to_string(), serde_json::json!(Utc::now()));

        let id = parse_record_id("category", category_ref);
        let mut result = self
            .base
            .db
            .query("UPDATE $id MERGE $data RETURN AFTER")
            .bind(("id", id))
            .bind(("data", serde_json::Value::Object(merge)))
            .await?;
        let categories: Vec<Category> = result.take(0)?;
        categories
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("category not found: {}", category_ref)))
    }

    /// Delete a category. Refused while any active product still
    /// references it.
    pub async fn delete(&self, category_ref: &str) -> RepoResult<()> {
        let id = parse_record_id("category", category_ref);
        let category_str = id.to_string();

        let mut result = self
            .base
            .db
            .query(
                "SELECT count() AS count FROM product \
                 WHERE category = $category AND is_active = true GROUP ALL",
            )
            .bind(("category", category_str))
            .await?;
        let count: Option<i64> = result.take((0, "count"))?;
        if count.unwrap_or(0) > 0 {
            return Err(RepoError::Validation(
                "cannot delete a category that still has products".to_string(),
            ));
        }

        let deleted: Option<Category> = self.base.db.delete(id).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!(
                "category not found: {}",
                category_ref
            )));
        }
        Ok(())
    }
}
