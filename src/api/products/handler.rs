//! Product handlers

use crate::api::convert;
use crate::auth::middleware::CurrentUser;
use crate::core::state::ServerState;
use crate::db::models::product::{ProductCreate, ProductUpdate, Review, ReviewCreate};
use crate::db::repository::{CategoryRepository, ProductRepository, product::ProductQuery};
use crate::utils::error::{AppError, AppResult};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    success: bool,
    count: usize,
    total: i64,
    page: i64,
    pages: i64,
    products: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    success: bool,
    product: Value,
}

/// GET /api/products
pub async fn list_products(
    State(state): State<ServerState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ProductListResponse>> {
    let products_repo = ProductRepository::new(state.db.clone());
    let categories = CategoryRepository::new(state.db.clone());

    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(12).clamp(1, 100);
    let (products, total) = products_repo.search(&query).await?;
    let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

    let products = convert::products_with_categories(&products, &categories).await?;
    Ok(Json(ProductListResponse {
        success: true,
        count: products.len(),
        total,
        page,
        pages,
        products,
    }))
}

/// GET /api/products/featured
pub async fn featured_products(
    State(state): State<ServerState>,
) -> AppResult<Json<serde_json::Value>> {
    let products_repo = ProductRepository::new(state.db.clone());
    let categories = CategoryRepository::new(state.db.clone());

    let products = products_repo.find_featured(8).await?;
    let products = convert::products_with_categories(&products, &categories).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": products.len(),
        "products": products,
    })))
}

/// GET /api/products/{id}
pub async fn get_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductResponse>> {
    let products_repo = ProductRepository::new(state.db.clone());
    // Inactive products stay fetchable by id so they can be inspected
    // and reactivated; only listings filter them out.
    let product = products_repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product not found: {}", id)))?;

    let categories = CategoryRepository::new(state.db.clone());
    let category = categories.find_by_id(&product.category).await?;
    Ok(Json(ProductResponse {
        success: true,
        product: convert::product_with_category(&product, category.as_ref()),
    }))
}

/// POST /api/products (admin)
pub async fn create_product(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    payload.validate()?;

    let products_repo = ProductRepository::new(state.db.clone());
    let product = products_repo.create(payload).await?;
    tracing::info!(name = %product.name, "product created");

    let categories = CategoryRepository::new(state.db.clone());
    let category = categories.find_by_id(&product.category).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            product: convert::product_with_category(&product, category.as_ref()),
        }),
    ))
}

/// PUT /api/products/{id} (admin)
pub async fn update_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ProductResponse>> {
    payload.validate()?;

    let products_repo = ProductRepository::new(state.db.clone());
    let product = products_repo.update(&id, payload).await?;

    let categories = CategoryRepository::new(state.db.clone());
    let category = categories.find_by_id(&product.category).await?;
    Ok(Json(ProductResponse {
        success: true,
        product: convert::product_with_category(&product, category.as_ref()),
    }))
}

/// DELETE /api/products/{id} (admin)
pub async fn delete_product(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let products_repo = ProductRepository::new(state.db.clone());
    products_repo.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Product deleted",
    })))
}

/// POST /api/products/{id}/reviews
pub async fn add_review(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ReviewCreate>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    payload.validate()?;

    let review = Review {
        user: current.id.clone(),
        name: current.name.clone(),
        rating: payload.rating,
        comment: payload.comment,
        created_at: Utc::now(),
    };

    let products_repo = ProductRepository::new(state.db.clone());
    let product = products_repo.add_review(&id, review).await.map_err(|e| {
        match e {
            crate::db::repository::RepoError::Duplicate(_) => AppError::DuplicateReview,
            other => other.into(),
        }
    })?;

    let categories = CategoryRepository::new(state.db.clone());
    let category = categories.find_by_id(&product.category).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            success: true,
            product: convert::product_with_category(&product, category.as_ref()),
        }),
    ))
}
