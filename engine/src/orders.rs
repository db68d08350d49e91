//! Order workflow: checkout, line mutation, status transitions, deletion.
//!
//! Every operation here is one unit of work. Checkout in particular is
//! the all-or-nothing path: guards, locked reservations, order and line
//! creation, total computation, and cart finalization either all commit
//! or none do. Failures after the first reservation are undone by the
//! unit of work rolling back, never by manual releases.

use crate::carts::ensure_checkout_eligible;
use crate::config::EngineConfig;
use crate::ledger;
use crate::store::{Store, UnitOfWork};
use storefront_core::{
    CartId, CartStatus, CustomerId, Error, Order, OrderId, OrderLine, OrderLineId, OrderStatus,
    PaymentStatus, ProductId, Result, totals,
};
use rust_decimal::Decimal;
use tracing::info;

/// The order workflow service.
#[derive(Debug, Clone)]
pub struct OrderService<S> {
    store: S,
    config: EngineConfig,
}

impl<S: Store> OrderService<S> {
    /// Create the service over a store.
    pub const fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Create an empty pending order for a customer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] on storage failure.
    pub async fn create(&self, customer_id: CustomerId) -> Result<Order> {
        let mut uow = self.store.begin().await?;
        let order = Order::pending(customer_id);
        uow.insert_order(&order).await?;
        uow.commit().await?;

        info!(order_id = %order.id, %customer_id, "order created");
        Ok(order)
    }

    /// Convert an active, non-empty cart into a pending order.
    ///
    /// Inside a single unit of work: run the cart guards, reserve stock
    /// for every line (locked, first failure aborts naming the product),
    /// create the order and its lines, persist the total, and finalize
    /// the cart.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the cart does not exist.
    /// - [`Error::CartNotModifiable`] if the cart is not active.
    /// - [`Error::Validation`] if the cart is empty.
    /// - [`Error::InsufficientStock`] if any line exceeds current stock.
    /// - [`Error::Store`] on storage failure.
    pub async fn create_from_cart(&self, cart_id: CartId) -> Result<(Order, Vec<OrderLine>)> {
        let mut uow = self.store.begin().await?;

        let cart = uow
            .cart_for_update(cart_id)
            .await?
            .ok_or_else(|| Error::not_found("cart", cart_id))?;
        let cart_lines = uow.cart_lines(cart_id).await?;
        ensure_checkout_eligible(&cart, &cart_lines)?;

        let requests: Vec<(ProductId, i32)> = cart_lines
            .iter()
            .map(|line| (line.product_id, line.quantity))
            .collect();
        ledger::reserve_all(&mut uow, &requests).await?;

        let order = Order::pending(cart.customer_id);
        uow.insert_order(&order).await?;

        let mut order_lines = Vec::with_capacity(cart_lines.len());
        for cart_line in &cart_lines {
            let line = OrderLine::new(
                order.id,
                cart_line.product_id,
                cart_line.quantity,
                cart_line.unit_price,
            );
            uow.insert_order_line(&line).await?;
            order_lines.push(line);
        }

        let total = totals::order_total(&order_lines);
        uow.set_order_total(order.id, total).await?;
        uow.set_cart_status(cart_id, CartStatus::Finalized).await?;
        uow.commit().await?;

        info!(
            order_id = %order.id,
            %cart_id,
            lines = order_lines.len(),
            %total,
            "checkout committed"
        );

        let order = Order { total, ..order };
        Ok((order, order_lines))
    }

    /// Fetch an order together with its lines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the order does not exist.
    pub async fn get(&self, order_id: OrderId) -> Result<(Order, Vec<OrderLine>)> {
        let mut uow = self.store.begin().await?;
        let order = require_order(&mut uow, order_id).await?;
        let lines = uow.order_lines(order_id).await?;
        Ok((order, lines))
    }

    /// All orders of a customer, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] on storage failure.
    pub async fn list_for_customer(&self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let mut uow = self.store.begin().await?;
        uow.orders_for_customer(customer_id).await
    }

    /// Add a product to a pending order, merging into an existing line
    /// when the product is already present. Only the newly added
    /// quantity is validated and reserved; units already on the line
    /// keep their earlier reservation.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the order or product does not exist.
    /// - [`Error::OrderNotModifiable`] if the order is not pending.
    /// - [`Error::InsufficientStock`] if the delta exceeds stock.
    /// - [`Error::Validation`] for a non-positive quantity or price.
    pub async fn add_line(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i32,
        unit_price: Option<Decimal>,
    ) -> Result<OrderLine> {
        totals::validate_quantity(quantity)?;
        if let Some(price) = unit_price {
            totals::validate_unit_price(price)?;
        }

        let mut uow = self.store.begin().await?;
        let order = require_order(&mut uow, order_id).await?;
        ensure_order_modifiable(&order)?;

        let product = uow
            .product(product_id)
            .await?
            .ok_or_else(|| Error::not_found("product", product_id))?;

        ledger::reserve(&mut uow, product_id, quantity).await?;

        let line = if let Some(mut line) = uow.find_order_line(order_id, product_id).await? {
            line.set_quantity(line.quantity + quantity);
            uow.update_order_line(&line).await?;
            line
        } else {
            let line = OrderLine::new(
                order_id,
                product_id,
                quantity,
                unit_price.unwrap_or(product.price),
            );
            uow.insert_order_line(&line).await?;
            line
        };

        recompute_total(&mut uow, order_id).await?;
        uow.commit().await?;

        info!(%order_id, %product_id, quantity = line.quantity, "order line written");
        Ok(line)
    }

    /// Replace a line's quantity. The stock delta is reserved (increase)
    /// or released (decrease); the subtotal and order total are
    /// recomputed in the same unit of work.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the line does not exist.
    /// - [`Error::OrderNotModifiable`] if the order is not pending.
    /// - [`Error::InsufficientStock`] if an increase exceeds stock.
    /// - [`Error::Validation`] for a non-positive quantity.
    pub async fn update_line_quantity(
        &self,
        line_id: OrderLineId,
        quantity: i32,
    ) -> Result<OrderLine> {
        totals::validate_quantity(quantity)?;

        let mut uow = self.store.begin().await?;
        let mut line = require_order_line(&mut uow, line_id).await?;
        let order = require_order(&mut uow, line.order_id).await?;
        ensure_order_modifiable(&order)?;

        let delta = quantity - line.quantity;
        if delta > 0 {
            ledger::reserve(&mut uow, line.product_id, delta).await?;
        } else if delta < 0 {
            ledger::release(&mut uow, line.product_id, -delta).await?;
        }

        line.set_quantity(quantity);
        uow.update_order_line(&line).await?;
        recompute_total(&mut uow, line.order_id).await?;
        uow.commit().await?;

        info!(order_id = %line.order_id, line_id = %line.id, quantity, delta, "order line resized");
        Ok(line)
    }

    /// Remove one line from a pending order, releasing its full
    /// reserved quantity back to stock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the line does not exist, or
    /// [`Error::OrderNotModifiable`] if the order is not pending.
    pub async fn remove_line(&self, line_id: OrderLineId) -> Result<()> {
        let mut uow = self.store.begin().await?;
        let line = require_order_line(&mut uow, line_id).await?;
        let order = require_order(&mut uow, line.order_id).await?;
        ensure_order_modifiable(&order)?;

        ledger::release(&mut uow, line.product_id, line.quantity).await?;
        uow.delete_order_line(line_id).await?;
        recompute_total(&mut uow, line.order_id).await?;
        uow.commit().await?;

        info!(order_id = %line.order_id, line_id = %line.id, "order line removed");
        Ok(())
    }

    /// Remove every line from a pending order, releasing all reserved
    /// stock and resetting the total to zero. Gated by
    /// [`EngineConfig::allow_bulk_line_removal`].
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if bulk removal is disabled.
    /// - [`Error::NotFound`] if the order does not exist.
    /// - [`Error::OrderNotModifiable`] if the order is not pending.
    pub async fn remove_all_lines(&self, order_id: OrderId) -> Result<u64> {
        if !self.config.allow_bulk_line_removal {
            return Err(Error::validation("bulk line removal is disabled"));
        }

        let mut uow = self.store.begin().await?;
        let order = require_order(&mut uow, order_id).await?;
        ensure_order_modifiable(&order)?;

        for line in uow.order_lines(order_id).await? {
            ledger::release(&mut uow, line.product_id, line.quantity).await?;
        }
        let removed = uow.delete_order_lines(order_id).await?;
        uow.set_order_total(order_id, Decimal::ZERO).await?;
        uow.commit().await?;

        info!(%order_id, removed, "order emptied");
        Ok(removed)
    }

    /// Move an order along its status graph.
    ///
    /// Cancellation is the only transition with a stock effect: every
    /// line's quantity is released back, in the same unit of work as the
    /// status write. Forward transitions are pure status changes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the order does not exist, or
    /// [`Error::InvalidTransition`] for an edge outside the graph.
    pub async fn update_status(&self, order_id: OrderId, next: OrderStatus) -> Result<Order> {
        let mut uow = self.store.begin().await?;
        let mut order = require_order(&mut uow, order_id).await?;

        if !order.status.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                entity: "order",
                from: order.status.as_str(),
                to: next.as_str(),
            });
        }

        if next == OrderStatus::Cancelled {
            for line in uow.order_lines(order_id).await? {
                ledger::release(&mut uow, line.product_id, line.quantity).await?;
            }
        }

        uow.set_order_status(order_id, next).await?;
        uow.commit().await?;

        info!(%order_id, from = %order.status, to = %next, "order status updated");
        order.status = next;
        Ok(order)
    }

    /// Delete an order, its lines, and its payment if one exists.
    /// Pending orders release their stock first; cancelled orders
    /// already released it when they were cancelled, so deletion
    /// touches no inventory. An approved payment is an immutable
    /// settlement record and blocks the deletion.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the order does not exist.
    /// - [`Error::OrderNotModifiable`] while it is being fulfilled.
    /// - [`Error::CannotDeleteApproved`] if the order's payment is
    ///   approved.
    pub async fn delete(&self, order_id: OrderId) -> Result<()> {
        let mut uow = self.store.begin().await?;
        let order = require_order(&mut uow, order_id).await?;

        if !order.status.is_deletable() {
            return Err(Error::OrderNotModifiable {
                status: order.status,
            });
        }

        if let Some(payment) = uow.payment_for_order(order_id).await? {
            if payment.status == PaymentStatus::Approved {
                return Err(Error::CannotDeleteApproved {
                    payment_id: payment.id,
                });
            }
            uow.delete_payment(payment.id).await?;
        }

        if order.status == OrderStatus::Pending {
            for line in uow.order_lines(order_id).await? {
                ledger::release(&mut uow, line.product_id, line.quantity).await?;
            }
        }

        uow.delete_order_lines(order_id).await?;
        uow.delete_order(order_id).await?;
        uow.commit().await?;

        info!(%order_id, status = %order.status, "order deleted");
        Ok(())
    }
}

/// Recompute and persist the order total from its current lines. Runs
/// inside every mutating unit of work so no committed state can show a
/// total that disagrees with the lines.
async fn recompute_total<U: UnitOfWork>(uow: &mut U, order_id: OrderId) -> Result<()> {
    let lines = uow.order_lines(order_id).await?;
    uow.set_order_total(order_id, totals::order_total(&lines))
        .await
}

fn ensure_order_modifiable(order: &Order) -> Result<()> {
    if !order.status.is_modifiable() {
        return Err(Error::OrderNotModifiable {
            status: order.status,
        });
    }
    Ok(())
}

async fn require_order<U: UnitOfWork>(uow: &mut U, order_id: OrderId) -> Result<Order> {
    uow.order(order_id)
        .await?
        .ok_or_else(|| Error::not_found("order", order_id))
}

async fn require_order_line<U: UnitOfWork>(
    uow: &mut U,
    line_id: OrderLineId,
) -> Result<OrderLine> {
    uow.order_line(line_id)
        .await?
        .ok_or_else(|| Error::not_found("order line", line_id))
}
