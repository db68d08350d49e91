//! Product catalog endpoints.
//!
//! - POST /api/products - Register a product
//! - GET /api/products - List products
//! - GET /api/products/:id - Get product details
//! - DELETE /api/products/:id - Delete an unreferenced product

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
use storefront_core::Product;
use storefront_engine::Store;
use uuid::Uuid;

/// Request to register a product.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    /// Display name.
    pub name: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Unit price; must be positive.
    pub price: Decimal,
    /// Opening stock; must not be negative.
    pub stock: i32,
}

/// Product details.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    /// Product id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Current unit price.
    pub price: Decimal,
    /// Units on hand.
    pub stock: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.0,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

/// Register a product with its opening stock.
pub async fn create_product<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    let product = state
        .catalog
        .create_product(
            request.name,
            request.description,
            request.price,
            request.stock,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(product.into())))
}

/// Get product details by id.
pub async fn get_product<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = state.catalog.get_product(id.into()).await?;
    Ok(Json(product.into()))
}

/// List all products.
pub async fn list_products<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = state.catalog.list_products().await?;
    Ok(Json(products.into_iter().map(Into::into).collect()))
}

/// Delete a product that no cart or order line references.
pub async fn delete_product<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.catalog.delete_product(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}
