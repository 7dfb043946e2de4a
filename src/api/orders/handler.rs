//! Order handlers

use crate::auth::middleware::CurrentUser;
use crate::core::state::ServerState;
use crate::db::models::order::{Order, OrderCreate, PaymentResult, StatusUpdate};
use crate::orders::{OrderEngine, Requester};
use crate::utils::error::AppResult;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

impl From<&CurrentUser> for Requester {
    fn from(current: &CurrentUser) -> Self {
        Requester {
            user_id: current.id.clone(),
            is_admin: current.is_admin(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    success: bool,
    order: Order,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    success: bool,
    count: usize,
    orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct OrderPageResponse {
    success: bool,
    count: usize,
    total: i64,
    page: i64,
    pages: i64,
    orders: Vec<Order>,
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<(StatusCode, Json<OrderResponse>)> {
    payload.validate()?;

    let engine = OrderEngine::new(state.db.clone());
    let order = engine.create_order(&Requester::from(&current), payload).await?;
    tracing::info!(user = %current.id, total = order.total_price, "order placed");
    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            success: true,
            order,
        }),
    ))
}

/// GET /api/orders/myorders
pub async fn my_orders(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
) -> AppResult<Json<OrderListResponse>> {
    let engine = OrderEngine::new(state.db.clone());
    let orders = engine.list_user_orders(&Requester::from(&current)).await?;
    Ok(Json(OrderListResponse {
        success: true,
        count: orders.len(),
        orders,
    }))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderResponse>> {
    let engine = OrderEngine::new(state.db.clone());
    let order = engine.get_order(&Requester::from(&current), &id).await?;
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// PUT /api/orders/{id}/pay
pub async fn pay_order(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    payment: Option<Json<PaymentResult>>,
) -> AppResult<Json<OrderResponse>> {
    let engine = OrderEngine::new(state.db.clone());
    let order = engine
        .mark_paid(
            &Requester::from(&current),
            &id,
            payment.map(|Json(p)| p),
        )
        .await?;
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// PUT /api/orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<ServerState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<OrderResponse>> {
    let engine = OrderEngine::new(state.db.clone());
    let order = engine.cancel_order(&Requester::from(&current), &id).await?;
    tracing::info!(order = %id, "order cancelled");
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}

/// GET /api/orders (admin)
pub async fn list_orders(
    State(state): State<ServerState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<OrderPageResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let engine = OrderEngine::new(state.db.clone());
    let (orders, total, pages) = engine.list_all(page, limit).await?;
    Ok(Json(OrderPageResponse {
        success: true,
        count: orders.len(),
        total,
        page,
        pages,
        orders,
    }))
}

/// PUT /api/orders/{id}/status (admin)
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<OrderResponse>> {
    let engine = OrderEngine::new(state.db.clone());
    let order = engine.update_status(&id, payload.status).await?;
    tracing::info!(order = %id, status = %order.status.as_str(), "order status updated");
    Ok(Json(OrderResponse {
        success: true,
        order,
    }))
}
