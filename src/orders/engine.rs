//! Order engine implementation

use crate::db::models::order::{Order, OrderCreate, OrderStatus, PaymentResult};
use crate::db::models::product::Product;
use crate::db::repository::{OrderRepository, ProductRepository, RepoError};
use chrono::Utc;
use surrealdb::{Surreal, engine::local::Db};
use thiserror::Error;

/// Order operation errors
#[derive(Error, Debug)]
pub enum OrderError {
    #[error("order must contain at least one item")]
    EmptyOrder,

    #[error("product not found: {0}")]
    ProductNotFound(String),

    #[error("insufficient stock for {name}: {available} available")]
    InsufficientStock { name: String, available: i64 },

    #[error("order not found: {0}")]
    OrderNotFound(String),

    #[error("not authorized for this order")]
    NotAuthorized,

    #[error("order has already been delivered")]
    AlreadyDelivered,

    #[error("order has already been cancelled")]
    AlreadyCancelled,

    #[error("order is in a terminal state")]
    TerminalState,

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<OrderError> for crate::utils::error::AppError {
    fn from(e: OrderError) -> Self {
        use crate::utils::error::AppError;
        match e {
            OrderError::EmptyOrder => AppError::validation("Order must contain at least one item"),
            OrderError::ProductNotFound(r) => AppError::not_found(format!("Product {}", r)),
            OrderError::OrderNotFound(r) => AppError::not_found(format!("Order {}", r)),
            OrderError::InsufficientStock { name, available } => {
                AppError::InsufficientStock { name, available }
            }
            OrderError::NotAuthorized => AppError::forbidden("Not authorized for this order"),
            OrderError::AlreadyDelivered => {
                AppError::invalid_state("Order has already been delivered")
            }
            OrderError::AlreadyCancelled => {
                AppError::invalid_state("Order has already been cancelled")
            }
            OrderError::TerminalState => {
                AppError::invalid_state("Order is in a terminal state")
            }
            OrderError::Repo(e) => e.into(),
        }
    }
}

/// The authenticated caller an order operation runs on behalf of
#[derive(Debug, Clone)]
pub struct Requester {
    /// User reference, as `user:key`
    pub user_id: String,
    pub is_admin: bool,
}

impl Requester {
    fn may_access(&self, order: &Order) -> bool {
        self.is_admin || order.user == self.user_id
    }
}

/// Order lifecycle engine. Owns checkout and every transition that
/// follows, keeping product stock in step with order state.
#[derive(Debug, Clone)]
pub struct OrderEngine {
    products: ProductRepository,
    orders: OrderRepository,
}

impl OrderEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            products: ProductRepository::new(db.clone()),
            orders: OrderRepository::new(db),
        }
    }

    /// Checkout. Validates every line item, then claims stock with one
    /// atomic conditional decrement per product. If any claim fails the
    /// earlier ones are rolled back and no order is written, so a
    /// rejected checkout never leaves partial stock mutations behind.
    pub async fn create_order(
        &self,
        requester: &Requester,
        data: OrderCreate,
    ) -> Result<Order, OrderError> {
        if data.order_items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        // First pass: resolve products and pre-check availability so the
        // common failure cases never touch stock at all.
        let mut resolved: Vec<(Product, i64)> = Vec::with_capacity(data.order_items.len());
        for item in &data.order_items {
            let product = self
                .products
                .find_by_id(&item.product)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| OrderError::ProductNotFound(item.product.clone()))?;
            if product.stock < item.quantity {
                return Err(OrderError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                });
            }
            resolved.push((product, item.quantity));
        }

        // Second pass: claim stock. Each decrement is atomic on its
        // record, so a concurrent checkout can still win the race for
        // the last unit; compensate the claims made so far and reject.
        let mut claimed: Vec<(String, i64)> = Vec::with_capacity(resolved.len());
        let mut items = Vec::with_capacity(resolved.len());
        for (product, quantity) in &resolved {
            let product_ref = product
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default();

            match self.products.try_decrement_stock(&product_ref, *quantity).await {
                Ok(Some(_)) => {
                    claimed.push((product_ref.clone(), *quantity));
                    items.push(crate::db::models::order::OrderItem {
                        product: product_ref,
                        name: product.name.clone(),
                        image: product.images.first().cloned(),
                        price: product.effective_price(),
                        quantity: *quantity,
                    });
                }
                Ok(None) => {
                    self.release_claims(&claimed).await;
                    let current = self
                        .products
                        .find_by_id(&product_ref)
                        .await
                        .ok()
                        .flatten();
                    return Err(OrderError::InsufficientStock {
                        name: product.name.clone(),
                        available: current.map(|p| p.stock).unwrap_or(0),
                    });
                }
                Err(e) => {
                    self.release_claims(&claimed).await;
                    return Err(e.into());
                }
            }
        }

        let order = Order {
            id: None,
            user: requester.user_id.clone(),
            order_items: items,
            shipping_address: data.shipping_address,
            payment_method: data.payment_method,
            items_price: data.items_price,
            tax_price: data.tax_price,
            shipping_price: data.shipping_price,
            total_price: data.total_price,
            status: OrderStatus::Pending,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            created_at: Utc::now(),
        };

        match self.orders.create(order).await {
            Ok(created) => Ok(created),
            Err(e) => {
                self.release_claims(&claimed).await;
                Err(e.into())
            }
        }
    }

    async fn release_claims(&self, claimed: &[(String, i64)]) {
        for (product_ref, quantity) in claimed {
            if let Err(e) = self.products.restore_stock(product_ref, *quantity).await {
                tracing::error!(product = %product_ref, quantity, "stock compensation failed: {}", e);
            }
        }
    }

    /// Fetch an order the requester is allowed to see
    pub async fn get_order(
        &self,
        requester: &Requester,
        order_ref: &str,
    ) -> Result<Order, OrderError> {
        let order = self
            .orders
            .find_by_id(order_ref)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_ref.to_string()))?;
        if !requester.may_access(&order) {
            return Err(OrderError::NotAuthorized);
        }
        Ok(order)
    }

    /// The requester's own order history, newest first
    pub async fn list_user_orders(&self, requester: &Requester) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.find_by_user(&requester.user_id).await?)
    }

    /// One page of every order in the system (admin)
    pub async fn list_all(&self, page: i64, limit: i64) -> Result<(Vec<Order>, i64, i64), OrderError> {
        let limit = limit.clamp(1, 100);
        let (orders, total) = self.orders.find_page(page, limit).await?;
        let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };
        Ok((orders, total, pages))
    }

    /// Cancel an order (owner or admin). Delivered and already-cancelled
    /// orders are rejected; otherwise every line item's stock is
    /// restored.
    pub async fn cancel_order(
        &self,
        requester: &Requester,
        order_ref: &str,
    ) -> Result<Order, OrderError> {
        let order = self
            .orders
            .find_by_id(order_ref)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_ref.to_string()))?;
        if !requester.may_access(&order) {
            return Err(OrderError::NotAuthorized);
        }
        match order.status {
            OrderStatus::Delivered => return Err(OrderError::AlreadyDelivered),
            OrderStatus::Cancelled => return Err(OrderError::AlreadyCancelled),
            _ => {}
        }

        for item in &order.order_items {
            self.products
                .restore_stock(&item.product, item.quantity)
                .await?;
        }

        Ok(self.orders.set_status(order_ref, OrderStatus::Cancelled).await?)
    }

    /// Admin status transition. Terminal orders admit none; moving to
    /// Delivered also stamps the delivery fields.
    pub async fn update_status(
        &self,
        order_ref: &str,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = self
            .orders
            .find_by_id(order_ref)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_ref.to_string()))?;
        if order.status.is_terminal() {
            return Err(OrderError::TerminalState);
        }

        // Only delivery carries a side effect (the delivered stamp in
        // the repository); stock is restored solely through the cancel
        // operation.
        Ok(self.orders.set_status(order_ref, status).await?)
    }

    /// Record a payment confirmation (owner or admin)
    pub async fn mark_paid(
        &self,
        requester: &Requester,
        order_ref: &str,
        payment_result: Option<PaymentResult>,
    ) -> Result<Order, OrderError> {
        let order = self
            .orders
            .find_by_id(order_ref)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_ref.to_string()))?;
        if !requester.may_access(&order) {
            return Err(OrderError::NotAuthorized);
        }
        if order.status == OrderStatus::Cancelled {
            return Err(OrderError::AlreadyCancelled);
        }

        Ok(self.orders.mark_paid(order_ref, payment_result).await?)
    }
}
