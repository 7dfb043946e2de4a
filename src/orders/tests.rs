//! Order engine tests against an in-memory database

use super::*;
use crate::db;
use crate::db::models::category::CategoryCreate;
use crate::db::models::order::{OrderCreate, OrderItemInput, OrderStatus, ShippingAddress};
use crate::db::models::product::{Product, ProductCreate};
use crate::db::repository::{CategoryRepository, ProductRepository};
use std::collections::BTreeMap;
use surrealdb::{Surreal, engine::local::Db};

struct TestEnv {
    db: Surreal<Db>,
    engine: OrderEngine,
    products: ProductRepository,
}

async fn setup() -> TestEnv {
    let db = db::open_in_memory().await.expect("in-memory db");
    TestEnv {
        engine: OrderEngine::new(db.clone()),
        products: ProductRepository::new(db.clone()),
        db,
    }
}

async fn seed_product(env: &TestEnv, name: &str, price: f64, stock: i64) -> Product {
    let categories = CategoryRepository::new(env.db.clone());
    let category = match categories.find_by_name("Gadgets").await.expect("lookup") {
        Some(c) => c,
        None => categories
            .create(CategoryCreate {
                name: "Gadgets".to_string(),
                description: None,
                image: None,
            })
            .await
            .expect("create category"),
    };

    env.products
        .create(ProductCreate {
            name: name.to_string(),
            description: format!("{} description", name),
            price,
            discount_price: None,
            category: category.id.as_ref().unwrap().to_string(),
            images: vec![format!("{}.jpg", name)],
            brand: None,
            stock,
            is_featured: false,
            tags: vec![],
            specifications: BTreeMap::new(),
        })
        .await
        .expect("create product")
}

fn customer() -> Requester {
    Requester {
        user_id: "user:alice".to_string(),
        is_admin: false,
    }
}

fn admin() -> Requester {
    Requester {
        user_id: "user:root".to_string(),
        is_admin: true,
    }
}

fn order_for(product: &Product, quantity: i64) -> OrderCreate {
    let unit = product.effective_price();
    OrderCreate {
        order_items: vec![OrderItemInput {
            product: product.id.as_ref().unwrap().to_string(),
            quantity,
        }],
        shipping_address: ShippingAddress {
            full_name: "Alice Example".to_string(),
            phone: "555-0100".to_string(),
            street: "1 Main St".to_string(),
            city: "Springfield".to_string(),
            state: None,
            zip_code: "12345".to_string(),
            country: "US".to_string(),
        },
        payment_method: "card".to_string(),
        items_price: unit * quantity as f64,
        tax_price: 0.0,
        shipping_price: 0.0,
        total_price: unit * quantity as f64,
    }
}

async fn reload(env: &TestEnv, product: &Product) -> Product {
    env.products
        .find_by_id(&product.id.as_ref().unwrap().to_string())
        .await
        .expect("reload")
        .expect("product exists")
}

#[tokio::test]
async fn test_checkout_decrements_stock_and_increments_sold() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 5).await;

    let order = env
        .engine
        .create_order(&customer(), order_for(&product, 3))
        .await
        .expect("checkout");

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.order_items.len(), 1);
    assert_eq!(order.order_items[0].price, 100.0);
    assert_eq!(order.order_items[0].name, "Widget");
    assert_eq!(order.shipping_address.full_name, "Alice Example");
    assert_eq!(order.shipping_address.phone, "555-0100");

    let after = reload(&env, &product).await;
    assert_eq!(after.stock, 2);
    assert_eq!(after.sold, 3);
}

#[tokio::test]
async fn test_checkout_rejects_insufficient_stock_without_mutation() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 5).await;

    let err = env
        .engine
        .create_order(&customer(), order_for(&product, 6))
        .await
        .expect_err("must reject");

    assert!(matches!(
        err,
        OrderError::InsufficientStock { available: 5, .. }
    ));

    let after = reload(&env, &product).await;
    assert_eq!(after.stock, 5);
    assert_eq!(after.sold, 0);
}

#[tokio::test]
async fn test_checkout_snapshots_discount_price() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 10).await;
    let product = env
        .products
        .update(
            &product.id.as_ref().unwrap().to_string(),
            crate::db::models::product::ProductUpdate {
                discount_price: Some(Some(80.0)),
                ..Default::default()
            },
        )
        .await
        .expect("set discount");

    let order = env
        .engine
        .create_order(&customer(), order_for(&product, 2))
        .await
        .expect("checkout");

    assert_eq!(order.order_items[0].price, 80.0);

    let after = reload(&env, &product).await;
    assert_eq!(after.stock, 8);
    assert_eq!(after.sold, 2);
}

#[tokio::test]
async fn test_multi_item_failure_compensates_earlier_claims() {
    let env = setup().await;
    let first = seed_product(&env, "Widget", 100.0, 5).await;
    let second = seed_product(&env, "Gizmo", 50.0, 1).await;

    let data = OrderCreate {
        order_items: vec![
            OrderItemInput {
                product: first.id.as_ref().unwrap().to_string(),
                quantity: 2,
            },
            OrderItemInput {
                product: second.id.as_ref().unwrap().to_string(),
                quantity: 3,
            },
        ],
        ..order_for(&first, 2)
    };

    let err = env
        .engine
        .create_order(&customer(), data)
        .await
        .expect_err("must reject");
    assert!(matches!(err, OrderError::InsufficientStock { .. }));

    let first_after = reload(&env, &first).await;
    assert_eq!(first_after.stock, 5);
    assert_eq!(first_after.sold, 0);
}

#[tokio::test]
async fn test_concurrent_checkout_for_last_unit() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 1).await;

    let engine_a = env.engine.clone();
    let engine_b = env.engine.clone();
    let order_a = order_for(&product, 1);
    let order_b = order_for(&product, 1);

    let (res_a, res_b) = tokio::join!(
        tokio::spawn(async move { engine_a.create_order(&customer(), order_a).await }),
        tokio::spawn(async move { engine_b.create_order(&customer(), order_b).await }),
    );
    let results = [res_a.expect("task"), res_b.expect("task")];
    let successes = results.iter().filter(|r| r.is_ok()).count();

    assert_eq!(successes, 1, "exactly one buyer gets the last unit");

    let after = reload(&env, &product).await;
    assert_eq!(after.stock, 0);
    assert_eq!(after.sold, 1);
}

#[tokio::test]
async fn test_cancel_restores_stock() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 5).await;
    let order = env
        .engine
        .create_order(&customer(), order_for(&product, 3))
        .await
        .expect("checkout");
    let order_ref = order.id.as_ref().unwrap().to_string();

    let cancelled = env
        .engine
        .cancel_order(&customer(), &order_ref)
        .await
        .expect("cancel");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let after = reload(&env, &product).await;
    assert_eq!(after.stock, 5);
    assert_eq!(after.sold, 0);
}

#[tokio::test]
async fn test_status_cancellation_leaves_stock_untouched() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 5).await;
    let order = env
        .engine
        .create_order(&customer(), order_for(&product, 3))
        .await
        .expect("checkout");
    let order_ref = order.id.as_ref().unwrap().to_string();

    // The status machine only writes the status; stock is restored
    // solely through the cancel operation.
    let cancelled = env
        .engine
        .update_status(&order_ref, OrderStatus::Cancelled)
        .await
        .expect("cancel via status");
    assert_eq!(cancelled.status, OrderStatus::Cancelled);

    let after = reload(&env, &product).await;
    assert_eq!(after.stock, 2);
    assert_eq!(after.sold, 3);
}

#[tokio::test]
async fn test_cancel_rejected_for_delivered_order() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 5).await;
    let order = env
        .engine
        .create_order(&customer(), order_for(&product, 1))
        .await
        .expect("checkout");
    let order_ref = order.id.as_ref().unwrap().to_string();

    env.engine
        .update_status(&order_ref, OrderStatus::Delivered)
        .await
        .expect("deliver");

    let err = env
        .engine
        .cancel_order(&customer(), &order_ref)
        .await
        .expect_err("must reject");
    assert!(matches!(err, OrderError::AlreadyDelivered));
}

#[tokio::test]
async fn test_double_cancel_rejected() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 5).await;
    let order = env
        .engine
        .create_order(&customer(), order_for(&product, 2))
        .await
        .expect("checkout");
    let order_ref = order.id.as_ref().unwrap().to_string();

    env.engine
        .cancel_order(&customer(), &order_ref)
        .await
        .expect("first cancel");
    let err = env
        .engine
        .cancel_order(&customer(), &order_ref)
        .await
        .expect_err("must reject");
    assert!(matches!(err, OrderError::AlreadyCancelled));

    // Stock restored exactly once
    let after = reload(&env, &product).await;
    assert_eq!(after.stock, 5);
    assert_eq!(after.sold, 0);
}

#[tokio::test]
async fn test_delivered_status_stamps_delivery_fields() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 5).await;
    let order = env
        .engine
        .create_order(&customer(), order_for(&product, 1))
        .await
        .expect("checkout");
    let order_ref = order.id.as_ref().unwrap().to_string();

    let shipped = env
        .engine
        .update_status(&order_ref, OrderStatus::Shipped)
        .await
        .expect("ship");
    assert!(!shipped.is_delivered);
    assert!(shipped.delivered_at.is_none());

    let delivered = env
        .engine
        .update_status(&order_ref, OrderStatus::Delivered)
        .await
        .expect("deliver");
    assert!(delivered.is_delivered);
    assert!(delivered.delivered_at.is_some());

    // Terminal: no further transitions
    let err = env
        .engine
        .update_status(&order_ref, OrderStatus::Processing)
        .await
        .expect_err("must reject");
    assert!(matches!(err, OrderError::TerminalState));
}

#[tokio::test]
async fn test_other_users_cannot_access_order() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 5).await;
    let order = env
        .engine
        .create_order(&customer(), order_for(&product, 1))
        .await
        .expect("checkout");
    let order_ref = order.id.as_ref().unwrap().to_string();

    let stranger = Requester {
        user_id: "user:mallory".to_string(),
        is_admin: false,
    };
    assert!(matches!(
        env.engine.get_order(&stranger, &order_ref).await,
        Err(OrderError::NotAuthorized)
    ));
    assert!(matches!(
        env.engine.cancel_order(&stranger, &order_ref).await,
        Err(OrderError::NotAuthorized)
    ));

    // Admins can always read
    assert!(env.engine.get_order(&admin(), &order_ref).await.is_ok());
}

#[tokio::test]
async fn test_mark_paid_records_payment() {
    let env = setup().await;
    let product = seed_product(&env, "Widget", 100.0, 5).await;
    let order = env
        .engine
        .create_order(&customer(), order_for(&product, 1))
        .await
        .expect("checkout");
    let order_ref = order.id.as_ref().unwrap().to_string();

    let paid = env
        .engine
        .mark_paid(
            &customer(),
            &order_ref,
            Some(crate::db::models::order::PaymentResult {
                id: Some("pay_123".to_string()),
                status: Some("COMPLETED".to_string()),
                update_time: None,
                email_address: Some("alice@example.com".to_string()),
            }),
        )
        .await
        .expect("pay");

    assert!(paid.is_paid);
    assert!(paid.paid_at.is_some());
    assert_eq!(
        paid.payment_result.as_ref().and_then(|p| p.id.clone()),
        Some("pay_123".to_string())
    );
}
