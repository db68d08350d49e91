//! Row types bridging SQL results and domain entities.
//!
//! Statuses are stored as their stable string form; decoding an unknown
//! value is reported as a store error, not a validation error, since it
//! can only mean a corrupt or out-of-date row.

use storefront_core::{
    Cart, CartLine, CartStatus, Error, Order, OrderLine, OrderStatus, Payment, PaymentMethod,
    PaymentStatus, Product, Result,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

fn parse_cart_status(s: &str) -> Result<CartStatus> {
    match s {
        "active" => Ok(CartStatus::Active),
        "abandoned" => Ok(CartStatus::Abandoned),
        "finalized" => Ok(CartStatus::Finalized),
        other => Err(Error::store(format!("unknown cart status: {other}"))),
    }
}

fn parse_order_status(s: &str) -> Result<OrderStatus> {
    match s {
        "pending" => Ok(OrderStatus::Pending),
        "processing" => Ok(OrderStatus::Processing),
        "shipped" => Ok(OrderStatus::Shipped),
        "delivered" => Ok(OrderStatus::Delivered),
        "cancelled" => Ok(OrderStatus::Cancelled),
        other => Err(Error::store(format!("unknown order status: {other}"))),
    }
}

fn parse_payment_method(s: &str) -> Result<PaymentMethod> {
    match s {
        "credit_card" => Ok(PaymentMethod::CreditCard),
        "debit_card" => Ok(PaymentMethod::DebitCard),
        "pix" => Ok(PaymentMethod::Pix),
        "boleto" => Ok(PaymentMethod::Boleto),
        other => Err(Error::store(format!("unknown payment method: {other}"))),
    }
}

fn parse_payment_status(s: &str) -> Result<PaymentStatus> {
    match s {
        "pending" => Ok(PaymentStatus::Pending),
        "approved" => Ok(PaymentStatus::Approved),
        "declined" => Ok(PaymentStatus::Declined),
        "refunded" => Ok(PaymentStatus::Refunded),
        other => Err(Error::store(format!("unknown payment status: {other}"))),
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    price: Decimal,
    stock: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            description: row.description,
            price: row.price,
            stock: row.stock,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct CartRow {
    id: Uuid,
    customer_id: Uuid,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for Cart {
    type Error = Error;

    fn try_from(row: CartRow) -> Result<Self> {
        Ok(Self {
            id: row.id.into(),
            customer_id: row.customer_id.into(),
            status: parse_cart_status(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct CartLineRow {
    id: Uuid,
    cart_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            id: row.id.into(),
            cart_id: row.cart_id.into(),
            product_id: row.product_id.into(),
            quantity: row.quantity,
            unit_price: row.unit_price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct OrderRow {
    id: Uuid,
    customer_id: Uuid,
    status: String,
    total: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = Error;

    fn try_from(row: OrderRow) -> Result<Self> {
        Ok(Self {
            id: row.id.into(),
            customer_id: row.customer_id.into(),
            status: parse_order_status(&row.status)?,
            total: row.total,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct OrderLineRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    subtotal: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            id: row.id.into(),
            order_id: row.order_id.into(),
            product_id: row.product_id.into(),
            quantity: row.quantity,
            unit_price: row.unit_price,
            subtotal: row.subtotal,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct PaymentRow {
    id: Uuid,
    order_id: Uuid,
    amount: Decimal,
    method: String,
    status: String,
    settled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = Error;

    fn try_from(row: PaymentRow) -> Result<Self> {
        Ok(Self {
            id: row.id.into(),
            order_id: row.order_id.into(),
            amount: row.amount,
            method: parse_payment_method(&row.method)?,
            status: parse_payment_status(&row.status)?,
            settled_at: row.settled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
