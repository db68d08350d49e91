//! Payment lifecycle: amount snapshot, uniqueness, approval lock-in.

#![allow(clippy::expect_used)] // Test code uses expect for clear failure messages

use storefront_core::{CustomerId, Error, PaymentMethod, PaymentStatus};
use storefront_engine::{EngineConfig, OrderService, PaymentService};
use storefront_testing::{fixtures, MemoryStore};
use chrono::Utc;
use rust_decimal_macros::dec;

fn services(store: &MemoryStore) -> (OrderService<MemoryStore>, PaymentService<MemoryStore>) {
    (
        OrderService::new(store.clone(), EngineConfig::new()),
        PaymentService::new(store.clone()),
    )
}

#[tokio::test]
async fn payment_amount_snapshots_the_order_total() {
    let store = MemoryStore::new();
    let (orders, payments) = services(&store);

    let product = fixtures::product("headphones", dec!(60.00), 4);
    store.seed_product(product.clone()).await;
    let order = orders.create(CustomerId::new()).await.expect("create");
    let line = orders
        .add_line(order.id, product.id, 2, None)
        .await
        .expect("add");

    let payment = payments
        .create(order.id, PaymentMethod::Pix)
        .await
        .expect("payment");
    assert_eq!(payment.amount, dec!(120.00));
    assert_eq!(payment.status, PaymentStatus::Pending);
    assert_eq!(payment.method, PaymentMethod::Pix);
    assert!(payment.settled_at.is_none());

    // A later line change does not chase the payment amount.
    orders
        .update_line_quantity(line.id, 1)
        .await
        .expect("shrink");
    let payment = payments.get(payment.id).await.expect("reload");
    assert_eq!(payment.amount, dec!(120.00));
}

#[tokio::test]
async fn an_order_holds_at_most_one_payment() {
    let store = MemoryStore::new();
    let (orders, payments) = services(&store);

    let order = orders.create(CustomerId::new()).await.expect("create");
    payments
        .create(order.id, PaymentMethod::CreditCard)
        .await
        .expect("first payment");

    let err = payments
        .create(order.id, PaymentMethod::Boleto)
        .await
        .expect_err("second payment");
    assert_eq!(err, Error::DuplicatePayment { order_id: order.id });
}

#[tokio::test]
async fn payment_requires_an_existing_order() {
    let store = MemoryStore::new();
    let (orders, payments) = services(&store);

    let order = orders.create(CustomerId::new()).await.expect("create");
    orders.delete(order.id).await.expect("delete");

    let err = payments
        .create(order.id, PaymentMethod::DebitCard)
        .await
        .expect_err("order gone");
    assert!(matches!(err, Error::NotFound { entity: "order", .. }));

    let err = payments
        .get_for_order(order.id)
        .await
        .expect_err("lookup on missing order");
    assert!(matches!(err, Error::NotFound { entity: "order", .. }));
}

#[tokio::test]
async fn approval_records_the_settlement_time() {
    let store = MemoryStore::new();
    let (orders, payments) = services(&store);

    let order = orders.create(CustomerId::new()).await.expect("create");
    let payment = payments
        .create(order.id, PaymentMethod::CreditCard)
        .await
        .expect("payment");

    let settled = Utc::now();
    let payment = payments
        .update(payment.id, Some(PaymentStatus::Approved), Some(settled))
        .await
        .expect("approve");
    assert_eq!(payment.status, PaymentStatus::Approved);
    assert_eq!(payment.settled_at, Some(settled));
}

#[tokio::test]
async fn approved_payments_only_move_to_refunded() {
    let store = MemoryStore::new();
    let (orders, payments) = services(&store);

    let order = orders.create(CustomerId::new()).await.expect("create");
    let payment = payments
        .create(order.id, PaymentMethod::Pix)
        .await
        .expect("payment");
    payments
        .update(payment.id, Some(PaymentStatus::Approved), None)
        .await
        .expect("approve");

    let err = payments
        .update(payment.id, Some(PaymentStatus::Pending), None)
        .await
        .expect_err("approved cannot revert");
    assert_eq!(
        err,
        Error::InvalidTransition {
            entity: "payment",
            from: "approved",
            to: "pending",
        }
    );

    let err = payments
        .update(payment.id, Some(PaymentStatus::Declined), None)
        .await
        .expect_err("approved cannot decline");
    assert!(matches!(err, Error::InvalidTransition { .. }));

    let payment = payments
        .update(payment.id, Some(PaymentStatus::Refunded), None)
        .await
        .expect("refund");
    assert_eq!(payment.status, PaymentStatus::Refunded);
}

#[tokio::test]
async fn approved_payments_cannot_be_deleted() {
    let store = MemoryStore::new();
    let (orders, payments) = services(&store);

    let order = orders.create(CustomerId::new()).await.expect("create");
    let payment = payments
        .create(order.id, PaymentMethod::Boleto)
        .await
        .expect("payment");
    payments
        .update(payment.id, Some(PaymentStatus::Approved), None)
        .await
        .expect("approve");

    let err = payments
        .delete(payment.id)
        .await
        .expect_err("approved is immutable");
    assert_eq!(
        err,
        Error::CannotDeleteApproved {
            payment_id: payment.id,
        }
    );
    payments.get(payment.id).await.expect("still present");
}

#[tokio::test]
async fn deleting_an_order_removes_its_pending_payment() {
    let store = MemoryStore::new();
    let (orders, payments) = services(&store);

    let order = orders.create(CustomerId::new()).await.expect("create");
    let payment = payments
        .create(order.id, PaymentMethod::Pix)
        .await
        .expect("payment");

    orders.delete(order.id).await.expect("delete");
    assert!(matches!(
        payments
            .get(payment.id)
            .await
            .expect_err("payment goes with its order"),
        Error::NotFound { entity: "payment", .. }
    ));
}

#[tokio::test]
async fn an_approved_payment_blocks_order_deletion() {
    let store = MemoryStore::new();
    let (orders, payments) = services(&store);

    let order = orders.create(CustomerId::new()).await.expect("create");
    let payment = payments
        .create(order.id, PaymentMethod::CreditCard)
        .await
        .expect("payment");
    payments
        .update(payment.id, Some(PaymentStatus::Approved), None)
        .await
        .expect("approve");

    let err = orders.delete(order.id).await.expect_err("settled record");
    assert_eq!(
        err,
        Error::CannotDeleteApproved {
            payment_id: payment.id,
        }
    );
    orders.get(order.id).await.expect("order still present");
    payments.get(payment.id).await.expect("payment still present");
}

#[tokio::test]
async fn pending_and_declined_payments_can_be_deleted() {
    let store = MemoryStore::new();
    let (orders, payments) = services(&store);

    let order = orders.create(CustomerId::new()).await.expect("create");
    let payment = payments
        .create(order.id, PaymentMethod::CreditCard)
        .await
        .expect("payment");
    payments
        .update(payment.id, Some(PaymentStatus::Declined), None)
        .await
        .expect("decline");

    payments.delete(payment.id).await.expect("delete declined");
    assert!(matches!(
        payments.get(payment.id).await.expect_err("gone"),
        Error::NotFound { entity: "payment", .. }
    ));

    // The order can then take a fresh payment attempt.
    let retry = payments
        .create(order.id, PaymentMethod::Pix)
        .await
        .expect("retry");
    assert_eq!(
        payments.get_for_order(order.id).await.expect("lookup"),
        Some(retry)
    );
}
