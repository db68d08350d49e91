//! Cart and cart-line endpoints.
//!
//! - POST /api/carts - Open a cart for a customer
//! - GET /api/carts/:id - Get a cart with its lines
//! - POST /api/carts/:id/abandon - Abandon an active cart
//! - DELETE /api/carts/:id - Delete a non-finalized cart
//! - POST /api/carts/:id/lines - Add a product (merges existing lines)
//! - DELETE /api/carts/:id/lines - Remove every line (config-gated)
//! - PUT /api/cart-lines/:id - Replace a line's quantity
//! - DELETE /api/cart-lines/:id - Remove one line

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storefront_core::{Cart, CartLine, CartStatus};
use storefront_engine::Store;
use uuid::Uuid;

/// Request to open a cart.
#[derive(Debug, Deserialize)]
pub struct CreateCartRequest {
    /// The owning customer.
    pub customer_id: Uuid,
}

/// Request to add a product to a cart.
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

/// Cart summary.
#[derive(Debug, Serialize)]
pub struct CartResponse {
    /// Cart id.
    pub id: Uuid,
    /// Owning customer.
    pub customer_id: Uuid,
    /// Lifecycle status.
    pub status: CartStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Cart> for CartResponse {
    fn from(cart: Cart) -> Self {
        Self {
            id: cart.id.0,
            customer_id: cart.customer_id.0,
            status: cart.status,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}

/// One line of a cart.
#[derive(Debug, Serialize)]
pub struct CartLineResponse {
    /// Line id.
    pub id: Uuid,
    /// Owning cart.
    pub cart_id: Uuid,
    /// Referenced product.
    pub product_id: Uuid,
    /// Units requested.
    pub quantity: i32,
    /// Price captured when the line was added.
    pub unit_price: Decimal,
}

impl From<CartLine> for CartLineResponse {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id.0,
            cart_id: line.cart_id.0,
            product_id: line.product_id.0,
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// Cart details with lines.
#[derive(Debug, Serialize)]
pub struct CartDetailResponse {
    /// The cart itself.
    #[serde(flatten)]
    pub cart: CartResponse,
    /// Its lines, oldest first.
    pub lines: Vec<CartLineResponse>,
}

/// How many rows a bulk removal deleted.
#[derive(Debug, Serialize)]
pub struct RemovedResponse {
    /// Number of lines removed.
    pub removed: u64,
}

/// Open a cart for a customer. Each customer has at most one.
pub async fn create_cart<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<CreateCartRequest>,
) -> Result<(StatusCode, Json<CartResponse>), AppError> {
    let cart = state.carts.create_cart(request.customer_id.into()).await?;
    Ok((StatusCode::CREATED, Json(cart.into())))
}

/// Get a cart with its lines.
pub async fn get_cart<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CartDetailResponse>, AppError> {
    let (cart, lines) = state.carts.get_cart(id.into()).await?;
    Ok(Json(CartDetailResponse {
        cart: cart.into(),
        lines: lines.into_iter().map(Into::into).collect(),
    }))
}

/// Abandon an active cart.
pub async fn abandon_cart<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<CartResponse>, AppError> {
    let cart = state.carts.abandon(id.into()).await?;
    Ok(Json(cart.into()))
}

/// Delete a cart and its lines. Finalized carts are kept.
pub async fn delete_cart<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.carts.delete_cart(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a product to a cart, merging into an existing line.
pub async fn add_line<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddLineRequest>,
) -> Result<(StatusCode, Json<CartLineResponse>), AppError> {
    let line = state
        .carts
        .add_line(
            id.into(),
            request.product_id.into(),
            request.quantity,
            request.unit_price,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(line.into())))
}

/// Remove every line from an active cart.
pub async fn clear_lines<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<RemovedResponse>, AppError> {
    let removed = state.carts.clear_lines(id.into()).await?;
    Ok(Json(RemovedResponse { removed }))
}

/// Replace a cart line's quantity.
pub async fn update_line_quantity<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartLineResponse>, AppError> {
    let line = state
        .carts
        .update_line_quantity(id.into(), request.quantity)
        .await?;
    Ok(Json(line.into()))
}

/// Remove one cart line.
pub async fn remove_line<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.carts.remove_line(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}
