//! Router configuration.

use crate::handlers::{carts, health, orders, payments, products};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use storefront_engine::Store;
use tower_http::trace::TraceLayer;

/// Build the complete Axum router over any store implementation.
pub fn build_router<S: Store + Clone + 'static>(state: AppState<S>) -> Router {
    let api_routes = Router::new()
        // Catalog
        .route("/products", post(products::create_product))
        .route("/products", get(products::list_products))
        .route("/products/:id", get(products::get_product))
        .route("/products/:id", delete(products::delete_product))
        // Carts
        .route("/carts", post(carts::create_cart))
        .route("/carts/:id", get(carts::get_cart))
        .route("/carts/:id", delete(carts::delete_cart))
        .route("/carts/:id/abandon", post(carts::abandon_cart))
        .route("/carts/:id/checkout", post(orders::checkout))
        .route("/carts/:id/lines", post(carts::add_line))
        .route("/carts/:id/lines", delete(carts::clear_lines))
        .route("/cart-lines/:id", put(carts::update_line_quantity))
        .route("/cart-lines/:id", delete(carts::remove_line))
        // Orders
        .route("/orders", post(orders::create_order))
        .route("/orders", get(orders::list_orders))
        .route("/orders/:id", get(orders::get_order))
        .route("/orders/:id", delete(orders::delete_order))
        .route("/orders/:id/status", put(orders::update_status))
        .route("/orders/:id/lines", post(orders::add_line))
        .route("/orders/:id/lines", delete(orders::remove_all_lines))
        .route("/order-lines/:id", put(orders::update_line_quantity))
        .route("/order-lines/:id", delete(orders::remove_line))
        // Payments
        .route("/orders/:id/payment", post(payments::create_payment))
        .route("/orders/:id/payment", get(payments::get_payment_for_order))
        .route("/payments/:id", get(payments::get_payment))
        .route("/payments/:id", put(payments::update_payment))
        .route("/payments/:id", delete(payments::delete_payment));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
