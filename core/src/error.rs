//! Error taxonomy shared across the workspace.

use crate::ids::{CartId, CartLineId, CustomerId, OrderId, OrderLineId, PaymentId, ProductId};
use crate::status::{CartStatus, OrderStatus};
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure mode the engine can surface to a caller.
///
/// Each variant carries enough context (offending id, current vs.
/// requested state) for the caller to decide whether a retry makes
/// sense. Anything raised inside a unit of work rolls the whole unit
/// back; callers never issue compensating writes themselves.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"order"` or `"product"`.
        entity: &'static str,
        /// The id that failed to resolve.
        id: Uuid,
    },

    /// A reservation asked for more units than the product has.
    #[error("product {product_id} has insufficient stock ({available} available, {requested} requested)")]
    InsufficientStock {
        /// The product that came up short.
        product_id: ProductId,
        /// Units the caller asked for.
        requested: i32,
        /// Units actually on hand at the time of the locked re-check.
        available: i32,
    },

    /// A status change outside the entity's transition graph.
    #[error("{entity} cannot move from '{from}' to '{to}'")]
    InvalidTransition {
        /// Entity kind, e.g. `"order"` or `"payment"`.
        entity: &'static str,
        /// Current status.
        from: &'static str,
        /// Requested status.
        to: &'static str,
    },

    /// Line mutation attempted on a cart that is no longer active.
    #[error("cart is {status}; lines can no longer change")]
    CartNotModifiable {
        /// The cart's current status.
        status: CartStatus,
    },

    /// Line mutation attempted on an order that is no longer pending.
    #[error("order is {status}; lines can only change while it is pending")]
    OrderNotModifiable {
        /// The order's current status.
        status: OrderStatus,
    },

    /// A second payment was created for the same order.
    #[error("order {order_id} already has a payment")]
    DuplicatePayment {
        /// The order that already carries a payment.
        order_id: OrderId,
    },

    /// Deletion attempted on an approved payment.
    #[error("payment {payment_id} is approved and cannot be deleted")]
    CannotDeleteApproved {
        /// The protected payment.
        payment_id: PaymentId,
    },

    /// Malformed input: non-positive quantity or price, unknown method, etc.
    #[error("{0}")]
    Validation(String),

    /// The backing store failed; the unit of work was rolled back.
    #[error("storage failure: {0}")]
    Store(String),
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] with a typed id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: impl Into<Uuid>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for a [`Error::Validation`] message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a [`Error::Store`] message.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }
}

impl From<CartId> for Uuid {
    fn from(id: CartId) -> Self {
        id.0
    }
}

impl From<CartLineId> for Uuid {
    fn from(id: CartLineId) -> Self {
        id.0
    }
}

impl From<CustomerId> for Uuid {
    fn from(id: CustomerId) -> Self {
        id.0
    }
}

impl From<OrderId> for Uuid {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

impl From<OrderLineId> for Uuid {
    fn from(id: OrderLineId) -> Self {
        id.0
    }
}

impl From<PaymentId> for Uuid {
    fn from(id: PaymentId) -> Self {
        id.0
    }
}

impl From<ProductId> for Uuid {
    fn from(id: ProductId) -> Self {
        id.0
    }
}
