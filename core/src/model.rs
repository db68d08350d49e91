//! Entity records.
//!
//! Plain data carried between the store and the services. All types are
//! `Clone` so snapshots can be taken cheaply by the in-memory store.

use crate::ids::{CartId, CartLineId, CustomerId, OrderId, OrderLineId, PaymentId, ProductId};
use crate::status::{CartStatus, OrderStatus, PaymentMethod, PaymentStatus};
use crate::totals;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A sellable product. `stock` is mutated only through the inventory
/// ledger; nothing else in the system may touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Optional long description.
    pub description: Option<String>,
    /// Current unit price. Captured onto lines at add time.
    pub price: Decimal,
    /// Units on hand. Never negative.
    pub stock: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A customer's shopping cart. Each customer has at most one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart id.
    pub id: CartId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Lifecycle status.
    pub status: CartStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Open a fresh active cart for `customer_id`.
    #[must_use]
    pub fn open(customer_id: CustomerId) -> Self {
        let now = Utc::now();
        Self {
            id: CartId::new(),
            customer_id,
            status: CartStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One product inside a cart. The (cart, product) pair is unique;
/// adding the same product again merges quantities instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line id.
    pub id: CartLineId,
    /// Owning cart.
    pub cart_id: CartId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Units requested. Always at least 1.
    pub quantity: i32,
    /// Price captured when the line was added.
    pub unit_price: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// A committed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Order id.
    pub id: OrderId,
    /// Purchasing customer.
    pub customer_id: CustomerId,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Always equals the sum of the line subtotals at every commit.
    pub total: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create an empty pending order with a zero total.
    #[must_use]
    pub fn pending(customer_id: CustomerId) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            customer_id,
            status: OrderStatus::Pending,
            total: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One product inside an order, with its reserved quantity and the
/// subtotal derived from the captured unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Line id.
    pub id: OrderLineId,
    /// Owning order.
    pub order_id: OrderId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Units reserved from stock. Always at least 1.
    pub quantity: i32,
    /// Price captured when the line was created.
    pub unit_price: Decimal,
    /// `unit_price * quantity`, recomputed on every quantity change.
    pub subtotal: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl OrderLine {
    /// Build a line for `order_id`, deriving the subtotal.
    #[must_use]
    pub fn new(
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        unit_price: Decimal,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: OrderLineId::new(),
            order_id,
            product_id,
            quantity,
            unit_price,
            subtotal: totals::line_subtotal(unit_price, quantity),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the quantity and recompute the subtotal.
    pub fn set_quantity(&mut self, quantity: i32) {
        self.quantity = quantity;
        self.subtotal = totals::line_subtotal(self.unit_price, quantity);
        self.updated_at = Utc::now();
    }
}

/// Payment for an order. At most one exists per order; the amount is a
/// snapshot of the order total at creation time and is never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Payment id.
    pub id: PaymentId,
    /// The paid-for order (unique).
    pub order_id: OrderId,
    /// Amount charged, copied from the order total at creation.
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

impl Payment {
    /// Open a pending payment for `order_id` over `amount`.
    #[must_use]
    pub fn pending(order_id: OrderId, amount: Decimal, method: PaymentMethod) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            order_id,
            amount,
            method,
            status: PaymentStatus::Pending,
            settled_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
