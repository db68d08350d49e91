//! Status enums and their transition tables.
//!
//! Each status is a closed enum and its transition graph lives in one
//! place, next to the type it governs, so no call site can invent a
//! state or an edge.

use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// Cart
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle status of a shopping cart.
///
/// Carts only move forward: an active cart can be abandoned or finalized
/// (by checkout), and neither terminal state is ever reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    /// Open for line mutation and checkout.
    Active,
    /// Given up by the customer or expired; immutable.
    Abandoned,
    /// Converted into an order by checkout; immutable.
    Finalized,
}

impl CartStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Active, Self::Abandoned) | (Self::Active, Self::Finalized)
        )
    }

    /// Whether cart lines may still be added, changed, or removed.
    #[must_use]
    pub const fn is_modifiable(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Stable string form used in errors and persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Abandoned => "abandoned",
            Self::Finalized => "finalized",
        }
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Order
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Newly created; the only state in which lines may change.
    Pending,
    /// Accepted for fulfillment.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Received by the customer. Terminal.
    Delivered,
    /// Cancelled; stock has been restored. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Whether moving from `self` to `next` is a legal transition.
    ///
    /// The graph is strictly forward with a single back-edge target:
    /// any non-terminal state may move to `Cancelled`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Shipped)
                | (Self::Shipped, Self::Delivered)
                | (Self::Pending | Self::Processing | Self::Shipped, Self::Cancelled)
        )
    }

    /// Whether order lines may still be added, changed, or removed.
    #[must_use]
    pub const fn is_modifiable(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the order may be deleted outright.
    ///
    /// Pending orders release their stock on deletion; cancelled orders
    /// already released it when they were cancelled.
    #[must_use]
    pub const fn is_deletable(self) -> bool {
        matches!(self, Self::Pending | Self::Cancelled)
    }

    /// Stable string form used in errors and persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Payment
// ═══════════════════════════════════════════════════════════════════════

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit card.
    CreditCard,
    /// Debit card.
    DebitCard,
    /// Pix instant transfer.
    Pix,
    /// Boleto bank slip.
    Boleto,
}

impl PaymentMethod {
    /// Stable string form used in errors and persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreditCard => "credit_card",
            Self::DebitCard => "debit_card",
            Self::Pix => "pix",
            Self::Boleto => "boleto",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settlement status of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Awaiting the gateway outcome.
    Pending,
    /// Settled by the gateway. The record becomes delete-protected.
    Approved,
    /// Rejected by the gateway.
    Declined,
    /// Returned to the customer after approval.
    Refunded,
}

impl PaymentStatus {
    /// Whether moving from `self` to `next` is a legal status update.
    ///
    /// Before approval the gateway outcome may be recorded freely, but an
    /// approved payment is locked in: the only way forward is a refund.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Approved => matches!(next, Self::Approved | Self::Refunded),
            Self::Pending | Self::Declined | Self::Refunded => true,
        }
    }

    /// Stable string form used in errors and persistence.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Declined => "declined",
            Self::Refunded => "refunded",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_transitions_are_forward_only() {
        assert!(CartStatus::Active.can_transition_to(CartStatus::Finalized));
        assert!(CartStatus::Active.can_transition_to(CartStatus::Abandoned));
        assert!(!CartStatus::Finalized.can_transition_to(CartStatus::Active));
        assert!(!CartStatus::Abandoned.can_transition_to(CartStatus::Active));
        assert!(!CartStatus::Abandoned.can_transition_to(CartStatus::Finalized));
        assert!(!CartStatus::Active.can_transition_to(CartStatus::Active));
    }

    #[test]
    fn test_order_happy_path_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Processing));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Shipped));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn test_order_cancellation_edges() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Processing.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn test_order_no_back_edges() {
        assert!(!OrderStatus::Processing.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Processing));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Shipped));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Shipped));
    }

    #[test]
    fn test_order_modifiability_and_deletability() {
        assert!(OrderStatus::Pending.is_modifiable());
        assert!(!OrderStatus::Processing.is_modifiable());
        assert!(OrderStatus::Pending.is_deletable());
        assert!(OrderStatus::Cancelled.is_deletable());
        assert!(!OrderStatus::Shipped.is_deletable());
        assert!(!OrderStatus::Delivered.is_deletable());
    }

    #[test]
    fn test_approved_payment_is_locked_in() {
        assert!(PaymentStatus::Approved.can_transition_to(PaymentStatus::Refunded));
        assert!(!PaymentStatus::Approved.can_transition_to(PaymentStatus::Pending));
        assert!(!PaymentStatus::Approved.can_transition_to(PaymentStatus::Declined));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Approved));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Declined));
    }

    #[test]
    fn test_status_round_trips_through_serde() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let back: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OrderStatus::Processing);
    }
}
