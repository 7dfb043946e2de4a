//! Product repository
//!
//! Catalog queries, review writes and the atomic stock mutations the
//! order engine relies on.

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::category::Category;
use crate::db::models::product::{Product, ProductCreate, ProductUpdate, Review};
use crate::utils::slug::slugify;
use chrono::Utc;
use serde::Deserialize;
use surrealdb::{Surreal, engine::local::Db};

/// Catalog listing filters and pagination
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductQuery {
    /// Category reference, as `category:key`
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    /// Full-text search over name, description and tags
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub brand: Option<String>,
    /// `price-asc` | `price-desc` | `rating` | `newest`
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Run a filtered, sorted, paginated catalog query. Returns the page
    /// of products and the total match count.
    pub async fn search(&self, query: &ProductQuery) -> RepoResult<(Vec<Product>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(12).clamp(1, 100);
        let start = (page - 1) * limit;

        let mut conditions = vec!["is_active = true".to_string()];
        if query.category.is_some() {
            conditions.push("category = $category".to_string());
        }
        if query.min_price.is_some() {
            conditions.push("price >= $min_price".to_string());
        }
        if query.max_price.is_some() {
            conditions.push("price <= $max_price".to_string());
        }
        if query.search.is_some() {
            conditions
                .push("(name @@ $search OR description @@ $search OR tags @@ $search)".to_string());
        }
        if query.featured.is_some() {
            conditions.push("is_featured = $featured".to_string());
        }
        if query.brand.is_some() {
            conditions.push("brand = $brand".to_string());
        }
        let where_clause = conditions.join(" AND ");

        let order_clause = match query.sort.as_deref() {
            Some("price-asc") => "ORDER BY price ASC",
            Some("price-desc") => "ORDER BY price DESC",
            Some("rating") => "ORDER BY ratings DESC",
            _ => "ORDER BY created_at DESC",
        };

        let select_sql = format!(
            "SELECT * FROM product WHERE {} {} LIMIT $limit START $start",
            where_clause, order_clause
        );
        let count_sql = format!(
            "SELECT count() AS count FROM product WHERE {} GROUP ALL",
            where_clause
        );

        let mut request = self
            .base
            .db
            .query(select_sql)
            .query(count_sql)
            .bind(("limit", limit))
            .bind(("start", start));
        if let Some(category) = &query.category {
            let id = parse_record_id("category", category);
            request = request.bind(("category", id.to_string()));
        }
        if let Some(min_price) = query.min_price {
            request = request.bind(("min_price", min_price));
        }
        if let Some(max_price) = query.max_price {
            request = request.bind(("max_price", max_price));
        }
        if let Some(search) = &query.search {
            request = request.bind(("search", search.clone()));
        }
        if let Some(featured) = query.featured {
            request = request.bind(("featured", featured));
        }
        if let Some(brand) = &query.brand {
            request = request.bind(("brand", brand.clone()));
        }

        let mut result = request.await?;
        let products: Vec<Product> = result.take(0)?;
        let total: Option<i64> = result.take((1, "count"))?;
        Ok((products, total.unwrap_or(0)))
    }

    pub async fn find_by_id(&self, product_ref: &str) -> RepoResult<Option<Product>> {
        let id = parse_record_id("product", product_ref);
        let product: Option<Product> = self.base.db.select(id).await?;
        Ok(product)
    }

    /// Featured picks for the storefront landing page
    pub async fn find_featured(&self, limit: i64) -> RepoResult<Vec<Product>> {
        let mut result = self
            .base
            .db
            .query(
                "SELECT * FROM product WHERE is_featured = true AND is_active = true \
                 ORDER BY created_at DESC LIMIT $limit",
            )
            .bind(("limit", limit))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products)
    }

    /// Create a product after checking the category exists and the
    /// discount undercuts the list price.
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if let Some(discount) = data.discount_price
            && discount > data.price
        {
            return Err(RepoError::Validation(
                "discount price cannot exceed the list price".to_string(),
            ));
        }

        let category_id = parse_record_id("category", &data.category);
        let exists: Option<Category> = self.base.db.select(category_id.clone()).await?;
        if exists.is_none() {
            return Err(RepoError::Validation(format!(
                "category not found: {}",
                data.category
            )));
        }

        let now = Utc::now();
        let product = Product {
            id: None,
            slug: slugify(&data.name),
            name: data.name,
            description: data.description,
            price: data.price,
            discount_price: data.discount_price,
            category: category_id.to_string(),
            images: data.images,
            brand: data.brand,
            stock: data.stock,
            sold: 0,
            ratings: 0.0,
            num_reviews: 0,
            reviews: vec![],
            is_featured: data.is_featured,
            is_active: true,
            tags: data.tags,
            specifications: data.specifications,
            created_at: now,
            updated_at: now,
        };

        let created: Option<Product> = self.base.db.create("product").content(product).await?;
        created.ok_or_else(|| RepoError::Database("failed to create product".to_string()))
    }

    /// Apply a partial update, re-validating the discount against
    /// whichever price ends up in effect.
    pub async fn update(&self, product_ref: &str, data: ProductUpdate) -> RepoResult<Product> {
        let existing = self
            .find_by_id(product_ref)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("product not found: {}", product_ref)))?;

        let new_price = data.price.unwrap_or(existing.price);
        let new_discount = match data.discount_price {
            Some(value) => value,
            None => existing.discount_price,
        };
        if let Some(discount) = new_discount {
            if discount < 0.0 {
                return Err(RepoError::Validation(
                    "discount price must not be negative".to_string(),
                ));
            }
            if discount > new_price {
                return Err(RepoError::Validation(
                    "discount price cannot exceed the list price".to_string(),
                ));
            }
        }

        let mut merge = serde_json::Map::new();
        if let Some(name) = data.name {
            merge.insert("slug".to_string(), serde_json::json!(slugify(&name)));
            merge.insert("name".to_string(), serde_json::json!(name));
        }
        if let Some(description) = data.description {
            merge.insert("description".to_string(), serde_json::json!(description));
        }
        if let Some(price) = data.price {
            merge.insert("price".to_string(), serde_json::json!(price));
        }
        if let Some(discount) = data.discount_price {
            merge.insert("discount_price".to_string(), serde_json::json!(discount));
        }
        if let Some(category) = data.category {
            let category_id = parse_record_id("category", &category);
            let exists: Option<Category> = self.base.db.select(category_id.clone()).await?;
            if exists.is_none() {
                return Err(RepoError::Validation(format!(
                    "category not found: {}",
                    category
                )));
            }
            merge.insert(
                "category".to_string(),
                serde_json::json!(category_id.to_string()),
            );
        }
        if let Some(images) = data.images {
            merge.insert("images".to_string(), serde_json::json!(images));
        }
        if let Some(brand) = data.brand {
            merge.insert("brand".to_string(), serde_json::json!(brand));
        }
        if let Some(stock) = data.stock {
            merge.insert("stock".to_string(), serde_json::json!(stock));
        }
        if let Some(is_featured) = data.is_featured {
            merge.insert("is_featured".to_string(), serde_json::json!(is_featured));
        }
        if let Some(is_active) = data.is_active {
            merge.insert("is_active".to_string(), serde_json::json!(is_active));
        }
        if let Some(tags) = data.tags {
            merge.insert("tags".to_string(), serde_json::json!(tags));
        }
        if let Some(specifications) = data.specifications {
            merge.insert(
                "specifications".to_string(),
                serde_json::json!(specifications),
            );
        }
        merge.insert("updated_at".to_string(), serde_json::json!(Utc::now()));

        let id = parse_record_id("product", product_ref);
        let mut result = self
            .base
            .db
            .query("UPDATE $id MERGE $data RETURN AFTER")
            .bind(("id", id))
            .bind(("data", serde_json::Value::Object(merge)))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("product not found: {}", product_ref)))
    }

    pub async fn delete(&self, product_ref: &str) -> RepoResult<()> {
        let id = parse_record_id("product", product_ref);
        let deleted: Option<Product> = self.base.db.delete(id).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!(
                "product not found: {}",
                product_ref
            )));
        }
        Ok(())
    }

    /// Append a review and persist the recomputed rating aggregate in
    /// the same write. One review per user per product.
    pub async fn add_review(&self, product_ref: &str, review: Review) -> RepoResult<Product> {
        let mut product = self
            .find_by_id(product_ref)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("product not found: {}", product_ref)))?;

        if product.has_review_from(&review.user) {
            return Err(RepoError::Duplicate(
                "product already reviewed by this user".to_string(),
            ));
        }

        product.reviews.push(review);
        product.recalculate_rating();

        let id = parse_record_id("product", product_ref);
        let mut result = self
            .base
            .db
            .query(
                "UPDATE $id SET reviews = $reviews, ratings = $ratings, \
                 num_reviews = $num_reviews, updated_at = $now RETURN AFTER",
            )
            .bind(("id", id))
            .bind(("reviews", product.reviews.clone()))
            .bind(("ratings", product.ratings))
            .bind(("num_reviews", product.num_reviews))
            .bind(("now", Utc::now()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("product not found: {}", product_ref)))
    }

    /// Atomically take `quantity` units of stock. The conditional update
    /// runs as a single statement on one record, so two concurrent
    /// buyers can never both take the last unit. Returns the updated
    /// product on success, `None` when stock was insufficient.
    pub async fn try_decrement_stock(
        &self,
        product_ref: &str,
        quantity: i64,
    ) -> RepoResult<Option<Product>> {
        let id = parse_record_id("product", product_ref);
        let mut result = self
            .base
            .db
            .query(
                "UPDATE $id SET stock -= $quantity, sold += $quantity, updated_at = $now \
                 WHERE stock >= $quantity RETURN AFTER",
            )
            .bind(("id", id))
            .bind(("quantity", quantity))
            .bind(("now", Utc::now()))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Return `quantity` units to stock (order cancellation, or
    /// compensation after a failed multi-item checkout)
    pub async fn restore_stock(&self, product_ref: &str, quantity: i64) -> RepoResult<()> {
        let id = parse_record_id("product", product_ref);
        self.base
            .db
            .query(
                "UPDATE $id SET stock += $quantity, sold -= $quantity, updated_at = $now",
            )
            .bind(("id", id))
            .bind(("quantity", quantity))
            .bind(("now", Utc::now()))
            .await?;
        Ok(())
    }
}
