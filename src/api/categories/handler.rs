//! Category handlers

use crate::core::state::ServerState;
use crate::db::models::category::{Category, CategoryCreate, CategoryUpdate};
use crate::db::repository::CategoryRepository;
use crate::utils::error::{AppError, AppResult};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use validator::Validate;

#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    success: bool,
    count: usize,
    categories: Vec<Category>,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    success: bool,
    category: Category,
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<ServerState>,
) -> AppResult<Json<CategoryListResponse>> {
    let repo = CategoryRepository::new(state.db.clone());
    let categories = repo.find_all().await?;
    Ok(Json(CategoryListResponse {
        success: true,
        count: categories.len(),
        categories,
    }))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CategoryResponse>> {
    let repo = CategoryRepository::new(state.db.clone());
    let category = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Category not found: {}", id)))?;
    Ok(Json(CategoryResponse {
        success: true,
        category,
    }))
}

/// POST /api/categories (admin)
pub async fn create_category(
    State(state): State<ServerState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<(StatusCode, Json<CategoryResponse>)> {
    payload.validate()?;

    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.create(payload).await?;
    tracing::info!(name = %category.name, "category created");
    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse {
            success: true,
            category,
        }),
    ))
}

/// PUT /api/categories/{id} (admin)
pub async fn update_category(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<CategoryResponse>> {
    payload.validate()?;

    let repo = CategoryRepository::new(state.db.clone());
    let category = repo.update(&id, payload).await?;
    Ok(Json(CategoryResponse {
        success: true,
        category,
    }))
}

/// DELETE /api/categories/{id} (admin)
pub async fn delete_category(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = CategoryRepository::new(state.db.clone());
    repo.delete(&id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Category deleted",
    })))
}
