//! Cart service: cart lifecycle and cart-line mutation.
//!
//! Carts never move stock, they only promise it. Stock is checked as a
//! ceiling when lines are written (a line may not ask for more than the
//! product currently has) and checked again, under a lock, when the cart
//! is checked out. A cart that is no longer active rejects every line
//! mutation.

use crate::config::EngineConfig;
use crate::store::{Store, UnitOfWork};
use storefront_core::{
    totals, Cart, CartId, CartLine, CartLineId, CartStatus, CustomerId, Error, ProductId, Result,
};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;

/// Cart lifecycle and cart-line operations.
#[derive(Debug, Clone)]
pub struct CartService<S> {
    store: S,
    config: EngineConfig,
}

impl<S: Store> CartService<S> {
    /// Create the service over a store.
    pub const fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Open a cart for a customer. Each customer has at most one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if the customer already has a cart,
    /// or [`Error::Store`] on storage failure.
    pub async fn create_cart(&self, customer_id: CustomerId) -> Result<Cart> {
        let mut uow = self.store.begin().await?;

        if uow.cart_for_customer(customer_id).await?.is_some() {
            return Err(Error::validation(format!(
                "customer {customer_id} already has a cart"
            )));
        }

        let cart = Cart::open(customer_id);
        uow.insert_cart(&cart).await?;
        uow.commit().await?;

        info!(cart_id = %cart.id, %customer_id, "cart created");
        Ok(cart)
    }

    /// Fetch a cart together with its lines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the cart does not exist.
    pub async fn get_cart(&self, cart_id: CartId) -> Result<(Cart, Vec<CartLine>)> {
        let mut uow = self.store.begin().await?;
        let cart = require_cart(&mut uow, cart_id).await?;
        let lines = uow.cart_lines(cart_id).await?;
        Ok((cart, lines))
    }

    /// Add a product to a cart, merging into an existing line when the
    /// product is already present. The resulting quantity may not exceed
    /// the product's current stock.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the cart or product does not exist.
    /// - [`Error::CartNotModifiable`] if the cart is not active.
    /// - [`Error::InsufficientStock`] if the merged quantity exceeds stock.
    /// - [`Error::Validation`] for a non-positive quantity or price.
    pub async fn add_line(
        &self,
        cart_id: CartId,
        product_id: ProductId,
        quantity: i32,
        unit_price: Option<Decimal>,
    ) -> Result<CartLine> {
        totals::validate_quantity(quantity)?;
        if let Some(price) = unit_price {
            totals::validate_unit_price(price)?;
        }

        let mut uow = self.store.begin().await?;
        let cart = require_cart(&mut uow, cart_id).await?;
        ensure_cart_modifiable(&cart)?;

        let product = uow
            .product(product_id)
            .await?
            .ok_or_else(|| Error::not_found("product", product_id))?;

        let existing = uow.find_cart_line(cart_id, product_id).await?;
        let merged_quantity = existing.as_ref().map_or(quantity, |l| l.quantity + quantity);
        if product.stock < merged_quantity {
            return Err(Error::InsufficientStock {
                product_id,
                requested: merged_quantity,
                available: product.stock,
            });
        }

        let line = if let Some(mut line) = existing {
            line.quantity = merged_quantity;
            if let Some(price) = unit_price {
                line.unit_price = price;
            }
            line.updated_at = Utc::now();
            uow.update_cart_line(&line).await?;
            line
        } else {
            let now = Utc::now();
            let line = CartLine {
                id: CartLineId::new(),
                cart_id,
                product_id,
                quantity,
                unit_price: unit_price.unwrap_or(product.price),
                created_at: now,
                updated_at: now,
            };
            uow.insert_cart_line(&line).await?;
            line
        };

        uow.commit().await?;
        info!(%cart_id, %product_id, quantity = line.quantity, "cart line written");
        Ok(line)
    }

    /// Replace a line's quantity, still subject to the stock ceiling.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the line does not exist.
    /// - [`Error::CartNotModifiable`] if the owning cart is not active.
    /// - [`Error::InsufficientStock`] if the quantity exceeds stock.
    /// - [`Error::Validation`] for a non-positive quantity.
    pub async fn update_line_quantity(
        &self,
        line_id: CartLineId,
        quantity: i32,
    ) -> Result<CartLine> {
        totals::validate_quantity(quantity)?;

        let mut uow = self.store.begin().await?;
        let mut line = uow
            .cart_line(line_id)
            .await?
            .ok_or_else(|| Error::not_found("cart line", line_id))?;
        let cart = require_cart(&mut uow, line.cart_id).await?;
        ensure_cart_modifiable(&cart)?;

        let product = uow
            .product(line.product_id)
            .await?
            .ok_or_else(|| Error::not_found("product", line.product_id))?;
        if product.stock < quantity {
            return Err(Error::InsufficientStock {
                product_id: line.product_id,
                requested: quantity,
                available: product.stock,
            });
        }

        line.quantity = quantity;
        line.updated_at = Utc::now();
        uow.update_cart_line(&line).await?;
        uow.commit().await?;
        Ok(line)
    }

    /// Remove one line from an active cart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the line does not exist, or
    /// [`Error::CartNotModifiable`] if the owning cart is not active.
    pub async fn remove_line(&self, line_id: CartLineId) -> Result<()> {
        let mut uow = self.store.begin().await?;
        let line = uow
            .cart_line(line_id)
            .await?
            .ok_or_else(|| Error::not_found("cart line", line_id))?;
        let cart = require_cart(&mut uow, line.cart_id).await?;
        ensure_cart_modifiable(&cart)?;

        uow.delete_cart_line(line_id).await?;
        uow.commit().await?;
        Ok(())
    }

    /// Remove every line from an active cart, returning how many were
    /// removed. Gated by [`EngineConfig::allow_bulk_line_removal`].
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if bulk removal is disabled.
    /// - [`Error::NotFound`] if the cart does not exist.
    /// - [`Error::CartNotModifiable`] if the cart is not active.
    pub async fn clear_lines(&self, cart_id: CartId) -> Result<u64> {
        if !self.config.allow_bulk_line_removal {
            return Err(Error::validation("bulk line removal is disabled"));
        }

        let mut uow = self.store.begin().await?;
        let cart = require_cart(&mut uow, cart_id).await?;
        ensure_cart_modifiable(&cart)?;

        let removed = uow.delete_cart_lines(cart_id).await?;
        uow.commit().await?;
        info!(%cart_id, removed, "cart cleared");
        Ok(removed)
    }

    /// Abandon an active cart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the cart does not exist, or
    /// [`Error::InvalidTransition`] if it is not active.
    pub async fn abandon(&self, cart_id: CartId) -> Result<Cart> {
        let mut uow = self.store.begin().await?;
        let mut cart = require_cart(&mut uow, cart_id).await?;

        if !cart.status.can_transition_to(CartStatus::Abandoned) {
            return Err(Error::InvalidTransition {
                entity: "cart",
                from: cart.status.as_str(),
                to: CartStatus::Abandoned.as_str(),
            });
        }

        cart.status = CartStatus::Abandoned;
        cart.updated_at = Utc::now();
        uow.set_cart_status(cart_id, CartStatus::Abandoned).await?;
        uow.commit().await?;

        info!(%cart_id, "cart abandoned");
        Ok(cart)
    }

    /// Delete a cart and its lines. Finalized carts are kept forever as
    /// the record behind their order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the cart does not exist, or
    /// [`Error::CartNotModifiable`] if it has been finalized.
    pub async fn delete_cart(&self, cart_id: CartId) -> Result<()> {
        let mut uow = self.store.begin().await?;
        let cart = require_cart(&mut uow, cart_id).await?;

        if cart.status == CartStatus::Finalized {
            return Err(Error::CartNotModifiable {
                status: cart.status,
            });
        }

        uow.delete_cart(cart_id).await?;
        uow.commit().await?;
        info!(%cart_id, "cart deleted");
        Ok(())
    }
}

/// Checkout guards, evaluated inside the checkout transaction by the
/// order workflow: the cart must be active and non-empty. Per-line stock
/// is *not* judged here; the ledger re-checks it under a lock when it
/// reserves.
///
/// # Errors
///
/// Returns [`Error::CartNotModifiable`] for a non-active cart and
/// [`Error::Validation`] for an empty one.
pub fn ensure_checkout_eligible(cart: &Cart, lines: &[CartLine]) -> Result<()> {
    ensure_cart_modifiable(cart)?;
    if lines.is_empty() {
        return Err(Error::validation(format!(
            "cart {} is empty; nothing to check out",
            cart.id
        )));
    }
    Ok(())
}

pub(crate) fn ensure_cart_modifiable(cart: &Cart) -> Result<()> {
    if !cart.status.is_modifiable() {
        return Err(Error::CartNotModifiable {
            status: cart.status,
        });
    }
    Ok(())
}

pub(crate) async fn require_cart<U: UnitOfWork>(uow: &mut U, cart_id: CartId) -> Result<Cart> {
    uow.cart(cart_id)
        .await?
        .ok_or_else(|| Error::not_found("cart", cart_id))
}
