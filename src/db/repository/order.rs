//! Order repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::order::{Order, OrderStatus, PaymentResult};
use chrono::Utc;
use surrealdb::{Surreal, engine::local::Db};

#[derive(Debug, Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db.create("orders").content(order).await?;
        created.ok_or_else(|| RepoError::Database("failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, order_ref: &str) -> RepoResult<Option<Order>> {
        let id = parse_record_id("orders", order_ref);
        let order: Option<Order> = self.base.db.select(id).await?;
        Ok(order)
    }

    /// All orders belonging to one buyer, newest first
    pub async fn find_by_user(&self, user_ref: &str) -> RepoResult<Vec<Order>> {
        let user_ref = user_ref.to_string();
        let mut result = self
            .base
            .db
            .query("SELECT * FROM orders WHERE user = $user ORDER BY created_at DESC")
            .bind(("user", user_ref))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        Ok(orders)
    }

    /// One page of all orders (admin listing), plus the total count
    pub async fn find_page(&self, page: i64, limit: i64) -> RepoResult<(Vec<Order>, i64)> {
        let page = page.max(1);
        let limit = limit.clamp(1, 100);
        let start = (page - 1) * limit;

        let mut result = self
            .base
            .db
            .query("SELECT * FROM orders ORDER BY created_at DESC LIMIT $limit START $start")
            .query("SELECT count() AS count FROM orders GROUP ALL")
            .bind(("limit", limit))
            .bind(("start", start))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        let total: Option<i64> = result.take((1, "count"))?;
        Ok((orders, total.unwrap_or(0)))
    }

    /// Write a new lifecycle status. Delivery also stamps the delivered
    /// flag and timestamp.
    pub async fn set_status(&self, order_ref: &str, status: OrderStatus) -> RepoResult<Order> {
        let id = parse_record_id("orders", order_ref);

        let mut result = if status == OrderStatus::Delivered {
            self.base
                .db
                .query(
                    "UPDATE $id SET status = $status, is_delivered = true, \
                     delivered_at = $now RETURN AFTER",
                )
                .bind(("id", id))
                .bind(("status", status))
                .bind(("now", Utc::now()))
                .await?
        } else {
            self.base
                .db
                .query("UPDATE $id SET status = $status RETURN AFTER")
                .bind(("id", id))
                .bind(("status", status))
                .await?
        };
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("order not found: {}", order_ref)))
    }

    /// Record the gateway confirmation and mark the order paid
    pub async fn mark_paid(
        &self,
        order_ref: &str,
        payment_result: Option<PaymentResult>,
    ) -> RepoResult<Order> {
        let id = parse_record_id("orders", order_ref);
        let mut result = self
            .base
            .db
            .query(
                "UPDATE $id SET is_paid = true, paid_at = $now, \
                 payment_result = $payment_result RETURN AFTER",
            )
            .bind(("id", id))
            .bind(("now", Utc::now()))
            .bind(("payment_result", payment_result))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("order not found: {}", order_ref)))
    }
}
