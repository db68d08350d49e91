//! The storage seam: [`Store`] and [`UnitOfWork`].
//!
//! A [`UnitOfWork`] is the set of mutations that must commit or abort
//! together: one checkout, one line update, one cancellation. Services
//! obtain one handle per request from [`Store::begin`], thread it through
//! every data call, and finish with [`UnitOfWork::commit`]. Dropping an
//! uncommitted handle discards all of its changes; that rollback is the
//! only recovery mechanism for in-flight failures, and callers never
//! issue compensating writes of their own.
//!
//! Methods are declared with explicit `Send` futures so services built
//! over a generic store can run on a multithreaded executor.
//!
//! The PostgreSQL implementation backs this with a real transaction; the
//! in-memory implementation used in tests serializes whole units of work,
//! which is coarser but preserves the same observable guarantees.

use storefront_core::{
    Cart, CartId, CartLine, CartLineId, CartStatus, CustomerId, Order, OrderId, OrderLine,
    OrderLineId, OrderStatus, Payment, PaymentId, Product, ProductId, Result,
};
use rust_decimal::Decimal;
use std::future::Future;

/// One atomic unit of mutation against the store.
///
/// Reads performed through the handle observe the unit's own uncommitted
/// writes. Every method may fail with [`storefront_core::Error::Store`]
/// if the backing store does.
pub trait UnitOfWork: Send {
    /// Commit everything staged in this unit.
    ///
    /// # Errors
    ///
    /// Returns [`storefront_core::Error::Store`] if the commit fails; the
    /// unit is rolled back in that case.
    fn commit(self) -> impl Future<Output = Result<()>> + Send;

    // ═══════════════════════════════════════════════════════════════════
    // Products
    // ═══════════════════════════════════════════════════════════════════

    /// Insert a new product.
    fn insert_product(&mut self, product: &Product) -> impl Future<Output = Result<()>> + Send;

    /// Fetch a product by id.
    fn product(&mut self, id: ProductId) -> impl Future<Output = Result<Option<Product>>> + Send;

    /// Fetch a product by id, locking its row for the remainder of the
    /// unit. All stock re-checks go through this so that concurrent
    /// reservations serialize on the product row.
    fn product_for_update(
        &mut self,
        id: ProductId,
    ) -> impl Future<Output = Result<Option<Product>>> + Send;

    /// List all products.
    fn products(&mut self) -> impl Future<Output = Result<Vec<Product>>> + Send;

    /// Overwrite a product's stock count.
    fn set_product_stock(
        &mut self,
        id: ProductId,
        stock: i32,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Whether any cart line or order line references the product.
    fn product_is_referenced(
        &mut self,
        id: ProductId,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Delete a product. The caller has already checked references.
    fn delete_product(&mut self, id: ProductId) -> impl Future<Output = Result<()>> + Send;

    // ═══════════════════════════════════════════════════════════════════
    // Carts
    // ═══════════════════════════════════════════════════════════════════

    /// Insert a new cart.
    fn insert_cart(&mut self, cart: &Cart) -> impl Future<Output = Result<()>> + Send;

    /// Fetch a cart by id.
    fn cart(&mut self, id: CartId) -> impl Future<Output = Result<Option<Cart>>> + Send;

    /// Fetch a cart by id, locking its row for the remainder of the
    /// unit. Checkout reads the cart through this so two simultaneous
    /// checkouts of the same cart serialize on its row and the loser
    /// sees the finalized status.
    fn cart_for_update(&mut self, id: CartId) -> impl Future<Output = Result<Option<Cart>>> + Send;

    /// Fetch the (unique) cart belonging to a customer.
    fn cart_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Option<Cart>>> + Send;

    /// Overwrite a cart's status.
    fn set_cart_status(
        &mut self,
        id: CartId,
        status: CartStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete a cart and all of its lines.
    fn delete_cart(&mut self, id: CartId) -> impl Future<Output = Result<()>> + Send;

    // ═══════════════════════════════════════════════════════════════════
    // Cart lines
    // ═══════════════════════════════════════════════════════════════════

    /// Insert a new cart line.
    fn insert_cart_line(&mut self, line: &CartLine) -> impl Future<Output = Result<()>> + Send;

    /// Fetch a cart line by id.
    fn cart_line(
        &mut self,
        id: CartLineId,
    ) -> impl Future<Output = Result<Option<CartLine>>> + Send;

    /// All lines of a cart, oldest first.
    fn cart_lines(&mut self, cart_id: CartId)
        -> impl Future<Output = Result<Vec<CartLine>>> + Send;

    /// The line for a given product in a cart, if present.
    fn find_cart_line(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Option<CartLine>>> + Send;

    /// Overwrite a cart line's quantity and unit price.
    fn update_cart_line(&mut self, line: &CartLine) -> impl Future<Output = Result<()>> + Send;

    /// Delete one cart line.
    fn delete_cart_line(&mut self, id: CartLineId) -> impl Future<Output = Result<()>> + Send;

    /// Delete every line of a cart, returning how many were removed.
    fn delete_cart_lines(&mut self, cart_id: CartId) -> impl Future<Output = Result<u64>> + Send;

    // ═══════════════════════════════════════════════════════════════════
    // Orders
    // ═══════════════════════════════════════════════════════════════════

    /// Insert a new order.
    fn insert_order(&mut self, order: &Order) -> impl Future<Output = Result<()>> + Send;

    /// Fetch an order by id.
    fn order(&mut self, id: OrderId) -> impl Future<Output = Result<Option<Order>>> + Send;

    /// All orders of a customer, newest first.
    fn orders_for_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> impl Future<Output = Result<Vec<Order>>> + Send;

    /// Overwrite an order's status.
    fn set_order_status(
        &mut self,
        id: OrderId,
        status: OrderStatus,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Overwrite an order's total.
    fn set_order_total(
        &mut self,
        id: OrderId,
        total: Decimal,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Delete an order and all of its lines.
    fn delete_order(&mut self, id: OrderId) -> impl Future<Output = Result<()>> + Send;

    // ═══════════════════════════════════════════════════════════════════
    // Order lines
    // ═══════════════════════════════════════════════════════════════════

    /// Insert a new order line.
    fn insert_order_line(&mut self, line: &OrderLine) -> impl Future<Output = Result<()>> + Send;

    /// Fetch an order line by id.
    fn order_line(
        &mut self,
        id: OrderLineId,
    ) -> impl Future<Output = Result<Option<OrderLine>>> + Send;

    /// All lines of an order, oldest first.
    fn order_lines(
        &mut self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<Vec<OrderLine>>> + Send;

    /// The line for a given product in an order, if present.
    fn find_order_line(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> impl Future<Output = Result<Option<OrderLine>>> + Send;

    /// Overwrite an order line's quantity and subtotal.
    fn update_order_line(&mut self, line: &OrderLine) -> impl Future<Output = Result<()>> + Send;

    /// Delete one order line.
    fn delete_order_line(&mut self, id: OrderLineId) -> impl Future<Output = Result<()>> + Send;

    /// Delete every line of an order, returning how many were removed.
    fn delete_order_lines(
        &mut self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<u64>> + Send;

    // ═══════════════════════════════════════════════════════════════════
    // Payments
    // ═══════════════════════════════════════════════════════════════════

    /// Insert a new payment.
    fn insert_payment(&mut self, payment: &Payment) -> impl Future<Output = Result<()>> + Send;

    /// Fetch a payment by id.
    fn payment(&mut self, id: PaymentId) -> impl Future<Output = Result<Option<Payment>>> + Send;

    /// Fetch the (unique) payment of an order.
    fn payment_for_order(
        &mut self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<Option<Payment>>> + Send;

    /// Overwrite a payment's status and settlement timestamp.
    fn update_payment(&mut self, payment: &Payment) -> impl Future<Output = Result<()>> + Send;

    /// Delete a payment. The caller has already checked delete protection.
    fn delete_payment(&mut self, id: PaymentId) -> impl Future<Output = Result<()>> + Send;
}

/// Hands out unit-of-work handles, one per inbound request.
pub trait Store: Send + Sync {
    /// The unit-of-work type this store produces.
    type Uow: UnitOfWork;

    /// Begin a new unit of work.
    ///
    /// # Errors
    ///
    /// Returns [`storefront_core::Error::Store`] if a transaction cannot
    /// be opened.
    fn begin(&self) -> impl Future<Output = Result<Self::Uow>> + Send;
}
