//! Order and order-line endpoints.
//!
//! - POST /api/orders - Create an empty pending order
//! - POST /api/carts/:id/checkout - Convert a cart into an order
//! - GET /api/orders?customer_id= - List a customer's orders
//! - GET /api/orders/:id - Get an order with its lines
//! - PUT /api/orders/:id/status - Move the order along its status graph
//! - DELETE /api/orders/:id - Delete a pending or cancelled order
//! - POST /api/orders/:id/lines - Add a product (merges existing lines)
//! - DELETE /api/orders/:id/lines - Remove every line (config-gated)
//! - PUT /api/order-lines/:id - Replace a line's quantity
//! - DELETE /api/order-lines/:id - Remove one line

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{Order, OrderLine, OrderStatus};
use storefront_engine::Store;
use uuid::Uuid;

/// Request to create an empty order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// The purchasing customer.
    pub customer_id: Uuid,
}

/// Query parameters for listing orders.
#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    /// The customer whose orders to list.
    pub customer_id: Uuid,
}

/// Request to move an order along its status graph.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    /// The target status.
    pub status: OrderStatus,
}

/// Request to add a product to an order.
#[derive(Debug, Deserialize)]
pub struct AddLineRequest {
    /// The product to add.
    pub product_id: Uuid,
    /// Units to add; merged into an existing line for the same product.
    pub quantity: i32,
    /// Price override; defaults to the product's current price.
    pub unit_price: Option<Decimal>,
}

/// Request to replace a line's quantity.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    /// The new quantity; must be at least 1.
    pub quantity: i32,
}

/// Order summary.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// Order id.
    pub id: Uuid,
    /// Purchasing customer.
    pub customer_id: Uuid,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Sum of the line subtotals.
    pub total: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id.0,
            customer_id: order.customer_id.0,
            status: order.status,
            total: order.total,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// One line of an order.
#[derive(Debug, Serialize)]
pub struct OrderLineResponse {
    /// Line id.
    pub id: Uuid,
    /// Owning order.
    pub order_id: Uuid,
    /// Referenced product.
    pub product_id: Uuid,
    /// Units reserved from stock.
    pub quantity: i32,
    /// Price captured when the line was created.
    pub unit_price: Decimal,
    /// `unit_price * quantity`.
    pub subtotal: Decimal,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            id: line.id.0,
            order_id: line.order_id.0,
            product_id: line.product_id.0,
            quantity: line.quantity,
            unit_price: line.unit_price,
            subtotal: line.subtotal,
        }
    }
}

/// Order details with lines.
#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    /// The order itself.
    #[serde(flatten)]
    pub order: OrderResponse,
    /// Its lines, oldest first.
    pub lines: Vec<OrderLineResponse>,
}

/// How many rows a bulk removal deleted.
#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    /// Number of lines removed.
    pub removed: u64,
}

fn detail(order: Order, lines: Vec<OrderLine>) -> OrderDetailResponse {
    OrderDetailResponse {
        order: order.into(),
        lines: lines.into_iter().map(Into::into).collect(),
    }
}

/// Create an empty pending order.
pub async fn create_order<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    let order = state.orders.create(request.customer_id.into()).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// Convert an active, non-empty cart into a pending order.
pub async fn checkout<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(cart_id): Path<Uuid>,
) -> Result<(StatusCode, Json<OrderDetailResponse>), AppError> {
    let (order, lines) = state.orders.create_from_cart(cart_id.into()).await?;
    Ok((StatusCode::CREATED, Json(detail(order, lines))))
}

/// List a customer's orders, newest first.
pub async fn list_orders<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<OrderResponse>>, AppError> {
    let orders = state
        .orders
        .list_for_customer(query.customer_id.into())
        .await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Get an order with its lines.
pub async fn get_order<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetailResponse>, AppError> {
    let (order, lines) = state.orders.get(id.into()).await?;
    Ok(Json(detail(order, lines)))
}

/// Move an order along its status graph.
pub async fn update_status<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state
        .orders
        .update_status(id.into(), request.status)
        .await?;
    Ok(Json(order.into()))
}

/// Delete a pending or cancelled order.
pub async fn delete_order<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.orders.delete(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a product to a pending order, merging into an existing line.
pub async fn add_line<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddLineRequest>,
) -> Result<(StatusCode, Json<OrderLineResponse>), AppError> {
    let line = state
        .orders
        .add_line(
            id.into(),
            request.product_id.into(),
            request.quantity,
            request.unit_price,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(line.into())))
}

/// Remove every line from a pending order.
pub async fn remove_all_lines<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RemovedResponse>, AppError> {
    let removed = state.orders.remove_all_lines(id.into()).await?;
    Ok(Json(RemovedResponse { removed }))
}

/// Replace an order line's quantity.
pub async fn update_line_quantity<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<OrderLineResponse>, AppError> {
    let line = state
        .orders
        .update_line_quantity(id.into(), request.quantity)
        .await?;
    Ok(Json(line.into()))
}

/// Remove one order line, releasing its stock.
pub async fn remove_line<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.orders.remove_line(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}
