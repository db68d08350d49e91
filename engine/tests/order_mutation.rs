//! Order-line mutation, status transitions, cancellation, and deletion.

#![allow(clippy::expect_used)] // Test code uses expect for clear failure messages

use storefront_core::{CustomerId, Error, OrderStatus};
use storefront_engine::{EngineConfig, OrderService};
use storefront_testing::{fixtures, MemoryStore};
use rust_decimal_macros::dec;

fn order_service(store: &MemoryStore) -> OrderService<MemoryStore> {
    OrderService::new(
        store.clone(),
        EngineConfig::new().with_bulk_line_removal(true),
    )
}

#[tokio::test]
async fn adding_a_line_reserves_stock_and_updates_the_total() {
    let store = MemoryStore::new();
    let orders = order_service(&store);

    let product = fixtures::product("lamp", dec!(12.50), 6);
    store.seed_product(product.clone()).await;
    let order = orders.create(CustomerId::new()).await.expect("create");

    let line = orders
        .add_line(order.id, product.id, 2, None)
        .await
        .expect("add line");
    assert_eq!(line.quantity, 2);
    assert_eq!(line.unit_price, dec!(12.50));
    assert_eq!(line.subtotal, dec!(25.00));

    assert_eq!(store.stock_of(product.id).await, 4);
    let (order, _) = orders.get(order.id).await.expect("get");
    assert_eq!(order.total, dec!(25.00));
}

#[tokio::test]
async fn adding_the_same_product_merges_and_reserves_only_the_delta() {
    let store = MemoryStore::new();
    let orders = order_service(&store);

    let product = fixtures::product("chair", dec!(40.00), 5);
    store.seed_product(product.clone()).await;
    let order = orders.create(CustomerId::new()).await.expect("create");

    orders
        .add_line(order.id, product.id, 3, None)
        .await
        .expect("first add");
    // Only 2 units remain; a merged request for 2 more must succeed
    // because just the delta is reserved.
    let line = orders
        .add_line(order.id, product.id, 2, None)
        .await
        .expect("merge add");

    assert_eq!(line.quantity, 5);
    assert_eq!(line.subtotal, dec!(200.00));
    assert_eq!(store.stock_of(product.id).await, 0);

    let (order, lines) = orders.get(order.id).await.expect("get");
    assert_eq!(lines.len(), 1);
    assert_eq!(order.total, dec!(200.00));
}

#[tokio::test]
async fn increasing_quantity_beyond_stock_is_rejected() {
    let store = MemoryStore::new();
    let orders = order_service(&store);

    let product = fixtures::product("desk", dec!(150.00), 3);
    store.seed_product(product.clone()).await;
    let order = orders.create(CustomerId::new()).await.expect("create");
    let line = orders
        .add_line(order.id, product.id, 2, None)
        .await
        .expect("add");

    // 1 unit left in stock; going from 2 to 4 needs a delta of 2.
    let err = orders
        .update_line_quantity(line.id, 4)
        .await
        .expect_err("delta exceeds stock");
    assert_eq!(
        err,
        Error::InsufficientStock {
            product_id: product.id,
            requested: 2,
            available: 1,
        }
    );
    assert_eq!(store.stock_of(product.id).await, 1);
}

#[tokio::test]
async fn decreasing_quantity_releases_the_difference() {
    let store = MemoryStore::new();
    let orders = order_service(&store);

    let product = fixtures::product("shelf", dec!(30.00), 10);
    store.seed_product(product.clone()).await;
    let order = orders.create(CustomerId::new()).await.expect("create");
    let line = orders
        .add_line(order.id, product.id, 6, None)
        .await
        .expect("add");
    assert_eq!(store.stock_of(product.id).await, 4);

    let line = orders
        .update_line_quantity(line.id, 2)
        .await
        .expect("shrink");
    assert_eq!(line.quantity, 2);
    assert_eq!(line.subtotal, dec!(60.00));
    assert_eq!(store.stock_of(product.id).await, 8);

    let (order, _) = orders.get(order.id).await.expect("get");
    assert_eq!(order.total, dec!(60.00));
}

#[tokio::test]
async fn removing_a_line_releases_its_full_quantity() {
    let store = MemoryStore::new();
    let orders = order_service(&store);

    let kept = fixtures::product("plate", dec!(8.00), 20);
    let dropped = fixtures::product("bowl", dec!(6.00), 20);
    store.seed_product(kept.clone()).await;
    store.seed_product(dropped.clone()).await;
    let order = orders.create(CustomerId::new()).await.expect("create");
    orders
        .add_line(order.id, kept.id, 2, None)
        .await
        .expect("add kept");
    let line = orders
        .add_line(order.id, dropped.id, 3, None)
        .await
        .expect("add dropped");

    orders.remove_line(line.id).await.expect("remove");

    assert_eq!(store.stock_of(dropped.id).await, 20);
    assert_eq!(store.stock_of(kept.id).await, 18);
    let (order, lines) = orders.get(order.id).await.expect("get");
    assert_eq!(lines.len(), 1);
    assert_eq!(order.total, dec!(16.00));
}

#[tokio::test]
async fn bulk_line_removal_is_gated_by_config() {
    let store = MemoryStore::new();
    let gated = OrderService::new(store.clone(), EngineConfig::new());

    let product = fixtures::product("mug", dec!(4.00), 5);
    store.seed_product(product.clone()).await;
    let order = gated.create(CustomerId::new()).await.expect("create");

    let err = gated
        .remove_all_lines(order.id)
        .await
        .expect_err("disabled by default");
    assert!(matches!(err, Error::Validation(_)));

    let open = order_service(&store);
    open.add_line(order.id, product.id, 2, None)
        .await
        .expect("add");
    let removed = open.remove_all_lines(order.id).await.expect("bulk remove");
    assert_eq!(removed, 1);
    assert_eq!(store.stock_of(product.id).await, 5);

    let (order, lines) = open.get(order.id).await.expect("get");
    assert!(lines.is_empty());
    assert_eq!(order.total, dec!(0));
}

#[tokio::test]
async fn cancelling_an_order_restores_every_line() {
    let store = MemoryStore::new();
    let orders = order_service(&store);

    let product_a = fixtures::product("pen", dec!(2.00), 12);
    let product_b = fixtures::product("notebook", dec!(5.00), 7);
    store.seed_product(product_a.clone()).await;
    store.seed_product(product_b.clone()).await;
    let order = orders.create(CustomerId::new()).await.expect("create");
    orders
        .add_line(order.id, product_a.id, 4, None)
        .await
        .expect("add a");
    orders
        .add_line(order.id, product_b.id, 3, None)
        .await
        .expect("add b");

    let order = orders
        .update_status(order.id, OrderStatus::Processing)
        .await
        .expect("to processing");
    let order = orders
        .update_status(order.id, OrderStatus::Cancelled)
        .await
        .expect("cancel");
    assert_eq!(order.status, OrderStatus::Cancelled);

    assert_eq!(store.stock_of(product_a.id).await, 12);
    assert_eq!(store.stock_of(product_b.id).await, 7);
}

#[tokio::test]
async fn status_graph_rejects_skips_and_reversals() {
    let store = MemoryStore::new();
    let orders = order_service(&store);
    let order = orders.create(CustomerId::new()).await.expect("create");

    let err = orders
        .update_status(order.id, OrderStatus::Shipped)
        .await
        .expect_err("pending cannot skip to shipped");
    assert_eq!(
        err,
        Error::InvalidTransition {
            entity: "order",
            from: "pending",
            to: "shipped",
        }
    );

    let order = orders
        .update_status(order.id, OrderStatus::Processing)
        .await
        .expect("forward");
    let err = orders
        .update_status(order.id, OrderStatus::Pending)
        .await
        .expect_err("no going back");
    assert_eq!(
        err,
        Error::InvalidTransition {
            entity: "order",
            from: "processing",
            to: "pending",
        }
    );
}

#[tokio::test]
async fn delivered_orders_cannot_be_cancelled() {
    let store = MemoryStore::new();
    let orders = order_service(&store);
    let order = orders.create(CustomerId::new()).await.expect("create");

    for next in [
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ] {
        orders.update_status(order.id, next).await.expect("forward");
    }

    let err = orders
        .update_status(order.id, OrderStatus::Cancelled)
        .await
        .expect_err("delivered is terminal");
    assert!(matches!(err, Error::InvalidTransition { .. }));
}

#[tokio::test]
async fn non_pending_orders_reject_line_mutation() {
    let store = MemoryStore::new();
    let orders = order_service(&store);

    let product = fixtures::product("poster", dec!(9.00), 10);
    store.seed_product(product.clone()).await;
    let order = orders.create(CustomerId::new()).await.expect("create");
    let line = orders
        .add_line(order.id, product.id, 1, None)
        .await
        .expect("add");
    orders
        .update_status(order.id, OrderStatus::Processing)
        .await
        .expect("to processing");

    let err = orders
        .add_line(order.id, product.id, 1, None)
        .await
        .expect_err("add on processing order");
    assert_eq!(
        err,
        Error::OrderNotModifiable {
            status: OrderStatus::Processing,
        }
    );

    let err = orders
        .update_line_quantity(line.id, 5)
        .await
        .expect_err("resize on processing order");
    assert!(matches!(err, Error::OrderNotModifiable { .. }));

    let err = orders.remove_line(line.id).await.expect_err("remove line");
    assert!(matches!(err, Error::OrderNotModifiable { .. }));
}

#[tokio::test]
async fn deleting_a_pending_order_restores_stock() {
    let store = MemoryStore::new();
    let orders = order_service(&store);

    let product = fixtures::product("vase", dec!(22.00), 8);
    store.seed_product(product.clone()).await;
    let order = orders.create(CustomerId::new()).await.expect("create");
    orders
        .add_line(order.id, product.id, 3, None)
        .await
        .expect("add");
    assert_eq!(store.stock_of(product.id).await, 5);

    orders.delete(order.id).await.expect("delete pending");
    assert_eq!(store.stock_of(product.id).await, 8);
    assert!(matches!(
        orders.get(order.id).await.expect_err("gone"),
        Error::NotFound { entity: "order", .. }
    ));
}

#[tokio::test]
async fn deleting_a_cancelled_order_does_not_restore_stock_twice() {
    let store = MemoryStore::new();
    let orders = order_service(&store);

    let product = fixtures::product("clock", dec!(18.00), 8);
    store.seed_product(product.clone()).await;
    let order = orders.create(CustomerId::new()).await.expect("create");
    orders
        .add_line(order.id, product.id, 3, None)
        .await
        .expect("add");
    orders
        .update_status(order.id, OrderStatus::Cancelled)
        .await
        .expect("cancel");
    assert_eq!(store.stock_of(product.id).await, 8);

    orders.delete(order.id).await.expect("delete cancelled");
    assert_eq!(store.stock_of(product.id).await, 8);
}

#[tokio::test]
async fn shipped_orders_cannot_be_deleted() {
    let store = MemoryStore::new();
    let orders = order_service(&store);
    let order = orders.create(CustomerId::new()).await.expect("create");
    orders
        .update_status(order.id, OrderStatus::Processing)
        .await
        .expect("forward");
    orders
        .update_status(order.id, OrderStatus::Shipped)
        .await
        .expect("forward");

    let err = orders.delete(order.id).await.expect_err("mid-fulfilment");
    assert_eq!(
        err,
        Error::OrderNotModifiable {
            status: OrderStatus::Shipped,
        }
    );
}

#[tokio::test]
async fn orders_list_newest_first() {
    let store = MemoryStore::new();
    let orders = order_service(&store);
    let customer = CustomerId::new();

    let first = orders.create(customer).await.expect("first");
    let second = orders.create(customer).await.expect("second");
    orders.create(CustomerId::new()).await.expect("stranger");

    let listed = orders.list_for_customer(customer).await.expect("list");
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}
