//! The inventory ledger: the single owner of stock mutation.
//!
//! Checkout, order-line mutation, and cancellation all move stock, and
//! they all do it through these three functions so the locking
//! discipline lives in one place. [`reserve`] re-reads the product row
//! under a lock ([`UnitOfWork::product_for_update`]) immediately before
//! the decrement, never from an earlier unlocked read; that closes the
//! check-then-write race between two checkouts contending for the last
//! unit.
//!
//! Idempotency is the caller's contract: [`release`] must be called
//! exactly once per previously reserved unit. All functions stage their
//! writes in the caller's unit of work; an error from any of them leaves
//! the unit poised to roll back with nothing partially applied.

use crate::store::UnitOfWork;
use storefront_core::{Error, ProductId, Result, totals};
use tracing::debug;

/// Reserve `quantity` units of a product, decrementing its stock.
///
/// # Errors
///
/// - [`Error::Validation`] for a non-positive quantity.
/// - [`Error::NotFound`] if the product does not exist.
/// - [`Error::InsufficientStock`] if fewer than `quantity` units remain
///   at the time of the locked re-check.
/// - [`Error::Store`] if the store fails.
pub async fn reserve<U: UnitOfWork>(
    uow: &mut U,
    product_id: ProductId,
    quantity: i32,
) -> Result<()> {
    totals::validate_quantity(quantity)?;

    let product = uow
        .product_for_update(product_id)
        .await?
        .ok_or_else(|| Error::not_found("product", product_id))?;

    if product.stock < quantity {
        return Err(Error::InsufficientStock {
            product_id,
            requested: quantity,
            available: product.stock,
        });
    }

    let remaining = product.stock - quantity;
    uow.set_product_stock(product_id, remaining).await?;
    debug!(%product_id, quantity, remaining, "reserved stock");
    Ok(())
}

/// Release `quantity` units back to a product, incrementing its stock.
///
/// Used on cancellation, line deletion, and quantity decrease.
///
/// # Errors
///
/// - [`Error::Validation`] for a non-positive quantity.
/// - [`Error::NotFound`] if the product does not exist.
/// - [`Error::Store`] if the store fails.
pub async fn release<U: UnitOfWork>(
    uow: &mut U,
    product_id: ProductId,
    quantity: i32,
) -> Result<()> {
    totals::validate_quantity(quantity)?;

    let product = uow
        .product_for_update(product_id)
        .await?
        .ok_or_else(|| Error::not_found("product", product_id))?;

    let remaining = product.stock + quantity;
    uow.set_product_stock(product_id, remaining).await?;
    debug!(%product_id, quantity, remaining, "released stock");
    Ok(())
}

/// Reserve stock for every `(product, quantity)` pair of a checkout in
/// one pass. The first failure aborts with that product named; because
/// all decrements are staged in the caller's unit of work, no partial
/// reservation is ever observable outside it.
///
/// # Errors
///
/// Same conditions as [`reserve`], for whichever pair fails first.
pub async fn reserve_all<U: UnitOfWork>(
    uow: &mut U,
    requests: &[(ProductId, i32)],
) -> Result<()> {
    for &(product_id, quantity) in requests {
        reserve(uow, product_id, quantity).await?;
    }
    Ok(())
}
