//! Response shaping helpers

use crate::db::models::category::Category;
use crate::db::models::product::Product;
use crate::db::repository::{CategoryRepository, RepoResult};
use serde_json::{Value, json};
use std::collections::HashMap;

/// Serialize a product with its category reference expanded into a
/// `{id, name, slug}` summary when the category is known
pub fn product_with_category(product: &Product, category: Option<&Category>) -> Value {
    let mut value = serde_json::to_value(product).unwrap_or(Value::Null);
    if let (Value::Object(map), Some(category)) = (&mut value, category) {
        map.insert(
            "category".to_string(),
            json!({
                "id": category.id.as_ref().map(|id| id.to_string()),
                "name": category.name,
                "slug": category.slug,
            }),
        );
    }
    value
}

/// Expand category references for a page of products with one lookup
/// per distinct category
pub async fn products_with_categories(
    products: &[Product],
    categories: &CategoryRepository,
) -> RepoResult<Vec<Value>> {
    let mut cache: HashMap<String, Option<Category>> = HashMap::new();
    let mut out = Vec::with_capacity(products.len());

    for product in products {
        if !cache.contains_key(&product.category) {
            let found = categories.find_by_id(&product.category).await?;
            cache.insert(product.category.clone(), found);
        }
        let category = cache.get(&product.category).and_then(|c| c.as_ref());
        out.push(product_with_category(product, category));
    }
    Ok(out)
}
