//! Handler tests over the in-memory store.

#![allow(clippy::expect_used)] // Test code uses expect for clear failure messages

use axum_test::TestServer;
use http::StatusCode;
use serde_json::{Value, json};
use storefront_engine::EngineConfig;
use storefront_testing::MemoryStore;
use storefront_web::{AppState, build_router};
use uuid::Uuid;

fn server() -> TestServer {
    server_with(EngineConfig::new().with_bulk_line_removal(true))
}

fn server_with(config: EngineConfig) -> TestServer {
    let state = AppState::new(MemoryStore::new(), config);
    TestServer::new(build_router(state)).expect("server should start")
}

async fn create_product(server: &TestServer, name: &str, price: &str, stock: i32) -> Uuid {
    let response = server
        .post("/api/products")
        .json(&json!({ "name": name, "price": price, "stock": stock }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("product id")
}

async fn create_cart(server: &TestServer) -> Uuid {
    let response = server
        .post("/api/carts")
        .json(&json!({ "customer_id": Uuid::new_v4() }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["id"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("cart id")
}

#[tokio::test]
async fn health_endpoint_responds() {
    let server = server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "ok" }));
}

#[tokio::test]
async fn checkout_flow_over_http() {
    let server = server();
    let product_a = create_product(&server, "keyboard", "10.00", 5).await;
    let product_b = create_product(&server, "mouse", "25.00", 3).await;
    let cart = create_cart(&server).await;

    server
        .post(&format!("/api/carts/{cart}/lines"))
        .json(&json!({ "product_id": product_a, "quantity": 2 }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post(&format!("/api/carts/{cart}/lines"))
        .json(&json!({ "product_id": product_b, "quantity": 1 }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.post(&format!("/api/carts/{cart}/checkout")).await;
    response.assert_status(StatusCode::CREATED);
    let order: Value = response.json();
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total"], "45.00");
    assert_eq!(order["lines"].as_array().expect("lines").len(), 2);

    let cart_after: Value = server.get(&format!("/api/carts/{cart}")).await.json();
    assert_eq!(cart_after["status"], "finalized");

    let product_after: Value = server
        .get(&format!("/api/products/{product_a}"))
        .await
        .json();
    assert_eq!(product_after["stock"], 3);
}

#[tokio::test]
async fn insufficient_stock_is_a_400_with_code() {
    let server = server();
    let product = create_product(&server, "gpu", "900.00", 1).await;
    let cart = create_cart(&server).await;

    let response = server
        .post(&format!("/api/carts/{cart}/lines"))
        .json(&json!({ "product_id": product, "quantity": 2 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
}

#[tokio::test]
async fn unknown_ids_are_404() {
    let server = server();
    server
        .get(&format!("/api/orders/{}", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&format!("/api/products/{}", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn second_payment_is_a_409() {
    let server = server();
    let response = server
        .post("/api/orders")
        .json(&json!({ "customer_id": Uuid::new_v4() }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let order: Value = response.json();
    let order_id = order["id"].as_str().expect("order id");

    server
        .post(&format!("/api/orders/{order_id}/payment"))
        .json(&json!({ "method": "pix" }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post(&format!("/api/orders/{order_id}/payment"))
        .json(&json!({ "method": "boleto" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "DUPLICATE_PAYMENT");
}

#[tokio::test]
async fn approved_payment_cannot_be_deleted_over_http() {
    let server = server();
    let order: Value = server
        .post("/api/orders")
        .json(&json!({ "customer_id": Uuid::new_v4() }))
        .await
        .json();
    let order_id = order["id"].as_str().expect("order id");

    let payment: Value = server
        .post(&format!("/api/orders/{order_id}/payment"))
        .json(&json!({ "method": "credit_card" }))
        .await
        .json();
    let payment_id = payment["id"].as_str().expect("payment id");

    server
        .put(&format!("/api/payments/{payment_id}"))
        .json(&json!({ "status": "approved" }))
        .await
        .assert_status_ok();

    let response = server.delete(&format!("/api/payments/{payment_id}")).await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "PAYMENT_APPROVED");
}

#[tokio::test]
async fn finalized_cart_rejects_mutation_with_403() {
    let server = server();
    let product = create_product(&server, "ssd", "80.00", 4).await;
    let cart = create_cart(&server).await;

    server
        .post(&format!("/api/carts/{cart}/lines"))
        .json(&json!({ "product_id": product, "quantity": 1 }))
        .await
        .assert_status(StatusCode::CREATED);
    server
        .post(&format!("/api/carts/{cart}/checkout"))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .post(&format!("/api/carts/{cart}/lines"))
        .json(&json!({ "product_id": product, "quantity": 1 }))
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "CART_NOT_MODIFIABLE");
}

#[tokio::test]
async fn bulk_line_removal_gate_applies_over_http() {
    let server = server_with(EngineConfig::new());
    let cart = create_cart(&server).await;

    let response = server.delete(&format!("/api/carts/{cart}/lines")).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn order_status_and_cancellation_over_http() {
    let server = server();
    let product = create_product(&server, "lamp", "12.00", 6).await;
    let order: Value = server
        .post("/api/orders")
        .json(&json!({ "customer_id": Uuid::new_v4() }))
        .await
        .json();
    let order_id = order["id"].as_str().expect("order id");

    server
        .post(&format!("/api/orders/{order_id}/lines"))
        .json(&json!({ "product_id": product, "quantity": 4 }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server
        .put(&format!("/api/orders/{order_id}/status"))
        .json(&json!({ "status": "shipped" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_TRANSITION");

    server
        .put(&format!("/api/orders/{order_id}/status"))
        .json(&json!({ "status": "cancelled" }))
        .await
        .assert_status_ok();

    let product_after: Value = server.get(&format!("/api/products/{product}")).await.json();
    assert_eq!(product_after["stock"], 6);
}
