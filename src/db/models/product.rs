//! Product Model
//!
//! Products embed their reviews and carry denormalized rating and stock
//! counters so list queries never fan out.

use super::serde_helpers;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surrealdb::RecordId;
use validator::Validate;

/// Product ID type
pub type ProductId = RecordId;

/// A customer review embedded in the product document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Reviewer reference, as `user:key`
    pub user: String,
    /// Reviewer display name at review time
    pub name: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// Product model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<ProductId>,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    /// Category reference, as `category:key`
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub sold: i64,
    /// Mean review rating, rounded to one decimal place
    #[serde(default)]
    pub ratings: f64,
    #[serde(default)]
    pub num_reviews: i64,
    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(
        default,
        deserialize_with = "serde_helpers::bool_false"
    )]
    pub is_featured: bool,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Price a buyer actually pays: the discount price when set,
    /// otherwise the list price.
    pub fn effective_price(&self) -> f64 {
        self.discount_price.unwrap_or(self.price)
    }

    /// Recompute `ratings` and `num_reviews` from the embedded reviews.
    /// The mean is rounded to one decimal place.
    pub fn recalculate_rating(&mut self) {
        self.num_reviews = self.reviews.len() as i64;
        if self.reviews.is_empty() {
            self.ratings = 0.0;
            return;
        }
        let sum: i64 = self.reviews.iter().map(|r| r.rating).sum();
        let mean = sum as f64 / self.reviews.len() as f64;
        self.ratings = (mean * 10.0).round() / 10.0;
    }

    /// Whether the given user already left a review
    pub fn has_review_from(&self, user_ref: &str) -> bool {
        self.reviews.iter().any(|r| r.user == user_ref)
    }
}

/// Product creation payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,
    #[validate(range(min = 0.0, message = "Discount price must not be negative"))]
    pub discount_price: Option<f64>,
    /// Category reference, as `category:key`
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    pub brand: Option<String>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
}

/// Product update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
    /// `Some(None)` clears the discount
    #[serde(
        default,
        deserialize_with = "deserialize_double_option"
    )]
    pub discount_price: Option<Option<f64>>,
    pub category: Option<String>,
    pub images: Option<Vec<String>>,
    pub brand: Option<String>,
    #[validate(range(min = 0, message = "Stock must not be negative"))]
    pub stock: Option<i64>,
    pub is_featured: Option<bool>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub specifications: Option<BTreeMap<String, String>>,
}

/// Distinguish an absent field from an explicit null
fn deserialize_double_option<'de, D>(d: D) -> Result<Option<Option<f64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<f64>::deserialize(d).map(Some)
}

/// Review submission payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReviewCreate {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i64,
    #[validate(length(min = 1, max = 1000, message = "Comment must be 1-1000 characters"))]
    pub comment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        Product {
            id: None,
            name: "Widget".to_string(),
            slug: "widget".to_string(),
            description: "A widget".to_string(),
            price: 100.0,
            discount_price: None,
            category: "category:gadgets".to_string(),
            images: vec![],
            brand: None,
            stock: 10,
            sold: 0,
            ratings: 0.0,
            num_reviews: 0,
            reviews: vec![],
            is_featured: false,
            is_active: true,
            tags: vec![],
            specifications: BTreeMap::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn review(user: &str, rating: i64) -> Review {
        Review {
            user: user.to_string(),
            name: "Tester".to_string(),
            rating,
            comment: "ok".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rating_mean_rounds_to_one_decimal() {
        let mut product = sample_product();
        product.reviews = vec![
            review("user:a", 4),
            review("user:b", 3),
            review("user:c", 3),
        ];
        product.recalculate_rating();

        assert_eq!(product.num_reviews, 3);
        assert_eq!(product.ratings, 3.3);
    }

    #[test]
    fn test_rating_resets_when_no_reviews() {
        let mut product = sample_product();
        product.ratings = 4.5;
        product.num_reviews = 9;
        product.recalculate_rating();

        assert_eq!(product.ratings, 0.0);
        assert_eq!(product.num_reviews, 0);
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        let mut product = sample_product();
        assert_eq!(product.effective_price(), 100.0);

        product.discount_price = Some(80.0);
        assert_eq!(product.effective_price(), 80.0);
    }

    #[test]
    fn test_has_review_from() {
        let mut product = sample_product();
        product.reviews.push(review("user:a", 5));

        assert!(product.has_review_from("user:a"));
        assert!(!product.has_review_from("user:b"));
    }
}
