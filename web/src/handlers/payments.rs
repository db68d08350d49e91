//! Payment endpoints.
//!
//! - POST /api/orders/:id/payment - Create the payment for an order
//! - GET /api/orders/:id/payment - Get an order's payment, if any
//! - GET /api/payments/:id - Get payment details
//! - PUT /api/payments/:id - Record the gateway outcome
//! - DELETE /api/payments/:id - Delete a non-approved payment

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
use storefront_core::{Payment, PaymentMethod, PaymentStatus};
use storefront_engine::Store;
use uuid::Uuid;

/// Request to create a payment for an order.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// How the customer pays.
    pub method: PaymentMethod,
}

/// Request to record the gateway outcome.
#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    /// The new settlement status, if it changed.
    pub status: Option<PaymentStatus>,
    /// When the gateway settled the payment.
    pub settled_at: Option<DateTime<Utc>>,
}

/// Payment details.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment id.
    pub id: Uuid,
    /// The paid-for order.
    pub order_id: Uuid,
    /// Amount charged, snapshotted from the order total.
    pub amount: Decimal,
    /// How the customer pays.
    pub method: PaymentMethod,
    /// Settlement status.
    pub status: PaymentStatus,
    /// When the gateway settled the payment, if it has.
    pub settled_at: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(payment: Payment) -> Self {
        Self {
            id: payment.id.0,
            order_id: payment.order_id.0,
            amount: payment.amount,
            method: payment.method,
            status: payment.status,
            settled_at: payment.settled_at,
            created_at: payment.created_at,
            updated_at: payment.updated_at,
        }
    }
}

/// Create the payment for an order, snapshotting its total.
pub async fn create_payment<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(order_id): Path<Uuid>,
    Json(request): Json<CreatePaymentRequest>,
) -> Result<(StatusCode, Json<PaymentResponse>), AppError> {
    let payment = state
        .payments
        .create(order_id.into(), request.method)
        .await?;
    Ok((StatusCode::CREATED, Json(payment.into())))
}

/// Get an order's payment, if any.
pub async fn get_payment_for_order<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<Option<PaymentResponse>>, AppError> {
    let payment = state.payments.get_for_order(order_id.into()).await?;
    Ok(Json(payment.map(Into::into)))
}

/// Get payment details by id.
pub async fn get_payment<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentResponse>, AppError> {
    let payment = state.payments.get(id.into()).await?;
    Ok(Json(payment.into()))
}

/// Record the gateway outcome for a payment.
pub async fn update_payment<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<PaymentResponse>, AppError> {
    let payment = state
        .payments
        .update(id.into(), request.status, request.settled_at)
        .await?;
    Ok(Json(payment.into()))
}

/// Delete a payment. Approved payments are immutable records.
pub async fn delete_payment<S: Store + Clone + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.payments.delete(id.into()).await?;
    Ok(StatusCode::NO_CONTENT)
}
