//! Subtotal and total arithmetic, plus input validation helpers.
//!
//! Every mutating workflow recomputes and persists the order total from
//! its lines inside the same unit of work, so no caller can observe an
//! order whose total disagrees with its lines.

use crate::error::{Error, Result};
use crate::model::OrderLine;
use rust_decimal::Decimal;

/// `unit_price * quantity` for a single line.
#[must_use]
pub fn line_subtotal(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Sum of line subtotals. Zero for an empty order.
#[must_use]
pub fn order_total(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(|line| line.subtotal).sum()
}

/// Reject quantities below 1.
///
/// # Errors
///
/// Returns [`Error::Validation`] for zero or negative quantities.
pub fn validate_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(Error::validation(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    Ok(())
}

/// Reject non-positive unit prices.
///
/// # Errors
///
/// Returns [`Error::Validation`] for zero or negative prices.
pub fn validate_unit_price(price: Decimal) -> Result<()> {
    if price <= Decimal::ZERO {
        return Err(Error::validation(format!(
            "unit price must be positive, got {price}"
        )));
    }
    Ok(())
}
