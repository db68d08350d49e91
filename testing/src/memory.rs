//! In-memory store.
//!
//! [`MemoryStore::begin`] takes the state lock for the lifetime of the
//! unit of work and hands out a staged copy; [`MemoryUnitOfWork::commit`]
//! swaps the staged copy back in, and dropping the unit without
//! committing discards it. Serializing whole units is coarser than the
//! database's row locks but preserves the same observable guarantees:
//! units are atomic, and two units racing for the last unit of stock
//! resolve in some serial order.

use storefront_engine::store::{Store, UnitOfWork};
use storefront_core::{
    Cart, CartId, CartLine, CartLineId, CartStatus, CustomerId, Order, OrderId, OrderLine,
    OrderLineId, OrderStatus, Payment, PaymentId, Product, ProductId, Result,
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<ProductId, Product>,
    carts: HashMap<CartId, Cart>,
    cart_lines: HashMap<CartLineId, CartLine>,
    orders: HashMap<OrderId, Order>,
    order_lines: HashMap<OrderLineId, OrderLine>,
    payments: HashMap<PaymentId, Payment>,
    // Monotonic insertion counter; keeps "oldest first" listings stable
    // even when timestamps collide inside one fast test.
    next_seq: u64,
    seq: HashMap<uuid::Uuid, u64>,
}

impl State {
    fn assign_seq(&mut self, id: uuid::Uuid) {
        self.seq.insert(id, self.next_seq);
        self.next_seq += 1;
    }

    fn seq_of(&self, id: uuid::Uuid) -> u64 {
        self.seq.get(&id).copied().unwrap_or(u64::MAX)
    }
}

/// In-memory implementation of the engine's store seam.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a product directly, outside any unit of work.
    pub async fn seed_product(&self, product: Product) {
        let mut state = self.state.lock().await;
        state.assign_seq(product.id.0);
        state.products.insert(product.id, product);
    }

    /// Seed a cart directly, outside any unit of work.
    pub async fn seed_cart(&self, cart: Cart) {
        let mut state = self.state.lock().await;
        state.assign_seq(cart.id.0);
        state.carts.insert(cart.id, cart);
    }

    /// Seed a cart line directly, outside any unit of work.
    pub async fn seed_cart_line(&self, line: CartLine) {
        let mut state = self.state.lock().await;
        state.assign_seq(line.id.0);
        state.cart_lines.insert(line.id, line);
    }

    /// Current stock of a product, for assertions.
    ///
    /// # Panics
    ///
    /// Panics if the product was never seeded.
    #[allow(clippy::panic)]
    pub async fn stock_of(&self, product_id: ProductId) -> i32 {
        let state = self.state.lock().await;
        match state.products.get(&product_id) {
            Some(product) => product.stock,
            None => panic!("product {product_id} not seeded"),
        }
    }
}

impl Store for MemoryStore {
    type Uow = MemoryUnitOfWork;

    async fn begin(&self) -> Result<Self::Uow> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(MemoryUnitOfWork { guard, staged })
    }
}

/// A unit of work over a staged copy of the store state.
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<State>,
    staged: State,
}

impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(mut self) -> Result<()> {
        *self.guard = self.staged;
        Ok(())
    }

    async fn insert_product(&mut self, product: &Product) -> Result<()> {
        self.staged.assign_seq(product.id.0);
        self.staged.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.staged.products.get(&id).cloned())
    }

    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>> {
        // The whole-store lock held by this unit already serializes
        // concurrent reservations.
        Ok(self.staged.products.get(&id).cloned())
    }

    async fn products(&mut self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.staged.products.values().cloned().collect();
        products.sort_by_key(|p| self.staged.seq_of(p.id.0));
        Ok(products)
    }

    async fn set_product_stock(&mut self, id: ProductId, stock: i32) -> Result<()> {
        if let Some(product) = self.staged.products.get_mut(&id) {
            product.stock = stock;
        }
        Ok(())
    }

    async fn product_is_referenced(&mut self, id: ProductId) -> Result<bool> {
        let in_carts = self.staged.cart_lines.values().any(|l| l.product_id == id);
        let in_orders = self.staged.order_lines.values().any(|l| l.product_id == id);
        Ok(in_carts || in_orders)
    }

    async fn delete_product(&mut self, id: ProductId) -> Result<()> {
        self.staged.products.remove(&id);
        Ok(())
    }

    async fn insert_cart(&mut self, cart: &Cart) -> Result<()> {
        self.staged.assign_seq(cart.id.0);
        self.staged.carts.insert(cart.id, cart.clone());
        Ok(())
    }

    async fn cart(&mut self, id: CartId) -> Result<Option<Cart>> {
        Ok(self.staged.carts.get(&id).cloned())
    }

    async fn cart_for_update(&mut self, id: CartId) -> Result<Option<Cart>> {
        // The whole-store lock held by this unit already serializes
        // concurrent checkouts.
        Ok(self.staged.carts.get(&id).cloned())
    }

    async fn cart_for_customer(&mut self, customer_id: CustomerId) -> Result<Option<Cart>> {
        Ok(self
            .staged
            .carts
            .values()
            .find(|c| c.customer_id == customer_id)
            .cloned())
    }

    async fn set_cart_status(&mut self, id: CartId, status: CartStatus) -> Result<()> {
        if let Some(cart) = self.staged.carts.get_mut(&id) {
            cart.status = status;
        }
        Ok(())
    }

    async fn delete_cart(&mut self, id: CartId) -> Result<()> {
        self.staged.carts.remove(&id);
        self.staged.cart_lines.retain(|_, l| l.cart_id != id);
        Ok(())
    }

    async fn insert_cart_line(&mut self, line: &CartLine) -> Result<()> {
        self.staged.assign_seq(line.id.0);
        self.staged.cart_lines.insert(line.id, line.clone());
        Ok(())
    }

    async fn cart_line(&mut self, id: CartLineId) -> Result<Option<CartLine>> {
        Ok(self.staged.cart_lines.get(&id).cloned())
    }

    async fn cart_lines(&mut self, cart_id: CartId) -> Result<Vec<CartLine>> {
        let mut lines: Vec<CartLine> = self
            .staged
            .cart_lines
            .values()
            .filter(|l| l.cart_id == cart_id)
            .cloned()
            .collect();
        lines.sort_by_key(|l| self.staged.seq_of(l.id.0));
        Ok(lines)
    }

    async fn find_cart_line(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>> {
        Ok(self
            .staged
            .cart_lines
            .values()
            .find(|l| l.cart_id == cart_id && l.product_id == product_id)
            .cloned())
    }

    async fn update_cart_line(&mut self, line: &CartLine) -> Result<()> {
        self.staged.cart_lines.insert(line.id, line.clone());
        Ok(())
    }

    async fn delete_cart_line(&mut self, id: CartLineId) -> Result<()> {
        self.staged.cart_lines.remove(&id);
        Ok(())
    }

    async fn delete_cart_lines(&mut self, cart_id: CartId) -> Result<u64> {
        let before = self.staged.cart_lines.len();
        self.staged.cart_lines.retain(|_, l| l.cart_id != cart_id);
        Ok((before - self.staged.cart_lines.len()) as u64)
    }

    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        self.staged.assign_seq(order.id.0);
        self.staged.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.staged.orders.get(&id).cloned())
    }

    async fn orders_for_customer(&mut self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self
            .staged
            .orders
            .values()
            .filter(|o| o.customer_id == customer_id)
            .cloned()
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(self.staged.seq_of(o.id.0)));
        Ok(orders)
    }

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()> {
        if let Some(order) = self.staged.orders.get_mut(&id) {
            order.status = status;
        }
        Ok(())
    }

    async fn set_order_total(&mut self, id: OrderId, total: Decimal) -> Result<()> {
        if let Some(order) = self.staged.orders.get_mut(&id) {
            order.total = total;
        }
        Ok(())
    }

    async fn delete_order(&mut self, id: OrderId) -> Result<()> {
        self.staged.orders.remove(&id);
        self.staged.order_lines.retain(|_, l| l.order_id != id);
        Ok(())
    }

    async fn insert_order_line(&mut self, line: &OrderLine) -> Result<()> {
        self.staged.assign_seq(line.id.0);
        self.staged.order_lines.insert(line.id, line.clone());
        Ok(())
    }

    async fn order_line(&mut self, id: OrderLineId) -> Result<Option<OrderLine>> {
        Ok(self.staged.order_lines.get(&id).cloned())
    }

    async fn order_lines(&mut self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        let mut lines: Vec<OrderLine> = self
            .staged
            .order_lines
            .values()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect();
        lines.sort_by_key(|l| self.staged.seq_of(l.id.0));
        Ok(lines)
    }

    async fn find_order_line(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<Option<OrderLine>> {
        Ok(self
            .staged
            .order_lines
            .values()
            .find(|l| l.order_id == order_id && l.product_id == product_id)
            .cloned())
    }

    async fn update_order_line(&mut self, line: &OrderLine) -> Result<()> {
        self.staged.order_lines.insert(line.id, line.clone());
        Ok(())
    }

    async fn delete_order_line(&mut self, id: OrderLineId) -> Result<()> {
        self.staged.order_lines.remove(&id);
        Ok(())
    }

    async fn delete_order_lines(&mut self, order_id: OrderId) -> Result<u64> {
        let before = self.staged.order_lines.len();
        self.staged.order_lines.retain(|_, l| l.order_id != order_id);
        Ok((before - self.staged.order_lines.len()) as u64)
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<()> {
        self.staged.assign_seq(payment.id.0);
        self.staged.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn payment(&mut self, id: PaymentId) -> Result<Option<Payment>> {
        Ok(self.staged.payments.get(&id).cloned())
    }

    async fn payment_for_order(&mut self, order_id: OrderId) -> Result<Option<Payment>> {
        Ok(self
            .staged
            .payments
            .values()
            .find(|p| p.order_id == order_id)
            .cloned())
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<()> {
        self.staged.payments.insert(payment.id, payment.clone());
        Ok(())
    }

    async fn delete_payment(&mut self, id: PaymentId) -> Result<()> {
        self.staged.payments.remove(&id);
        Ok(())
    }
}
