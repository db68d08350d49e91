//! The PostgreSQL store: one unit of work per transaction.

use crate::rows::{CartLineRow, CartRow, OrderLineRow, OrderRow, PaymentRow, ProductRow};
use storefront_core::{
    Cart, CartId, CartLine, CartLineId, CartStatus, CustomerId, Error, Order, OrderId, OrderLine,
    OrderLineId, OrderStatus, Payment, PaymentId, Product, ProductId, Result,
};
use storefront_engine::{Store, UnitOfWork};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

fn db_err(e: sqlx::Error) -> Error {
    Error::store(e.to_string())
}

/// PostgreSQL-backed [`Store`].
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if the connection cannot be established.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await.map_err(db_err)?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Store`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::store(format!("migration failed: {e}")))?;
        Ok(())
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl Store for PgStore {
    type Uow = PgUnitOfWork;

    async fn begin(&self) -> Result<Self::Uow> {
        let tx = self.pool.begin().await.map_err(db_err)?;
        Ok(PgUnitOfWork { tx })
    }
}

/// One open transaction. Dropping the handle without committing rolls
/// the transaction back.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork for PgUnitOfWork {
    async fn commit(self) -> Result<()> {
        self.tx.commit().await.map_err(db_err)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Products
    // ═══════════════════════════════════════════════════════════════════

    async fn insert_product(&mut self, product: &Product) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO products (id, name, description, price, stock, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(product.id.0)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn product(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, stock, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(row.map(Product::from))
    }

    async fn product_for_update(&mut self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, stock, created_at, updated_at
            FROM products
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        debug!(product_id = %id, locked = row.is_some(), "product row lock");
        Ok(row.map(Product::from))
    }

    async fn products(&mut self) -> Result<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, description, price, stock, created_at, updated_at
            FROM products
            ORDER BY created_at
            ",
        )
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn set_product_stock(&mut self, id: ProductId, stock: i32) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE products
            SET stock = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .bind(stock)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("product", id));
        }
        Ok(())
    }

    async fn product_is_referenced(&mut self, id: ProductId) -> Result<bool> {
        let referenced = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM cart_lines WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM order_lines WHERE product_id = $1)
            ",
        )
        .bind(id.0)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(referenced)
    }

    async fn delete_product(&mut self, id: ProductId) -> Result<()> {
        sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Carts
    // ═══════════════════════════════════════════════════════════════════

    async fn insert_cart(&mut self, cart: &Cart) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO carts (id, customer_id, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(cart.id.0)
        .bind(cart.customer_id.0)
        .bind(cart.status.as_str())
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            // The unique index on customer_id backstops the one-cart
            // check when two creates race between check and insert.
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return Error::validation(format!(
                        "customer {} already has a cart",
                        cart.customer_id
                    ));
                }
            }
            db_err(e)
        })?;
        Ok(())
    }

    async fn cart(&mut self, id: CartId) -> Result<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, customer_id, status, created_at, updated_at
            FROM carts
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        row.map(Cart::try_from).transpose()
    }

    async fn cart_for_update(&mut self, id: CartId) -> Result<Option<Cart>> {
        debug!(cart_id = %id, "locking cart row");
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, customer_id, status, created_at, updated_at
            FROM carts
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        row.map(Cart::try_from).transpose()
    }

    async fn cart_for_customer(&mut self, customer_id: CustomerId) -> Result<Option<Cart>> {
        let row = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, customer_id, status, created_at, updated_at
            FROM carts
            WHERE customer_id = $1
            ",
        )
        .bind(customer_id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        row.map(Cart::try_from).transpose()
    }

    async fn set_cart_status(&mut self, id: CartId, status: CartStatus) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE carts
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .bind(status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("cart", id));
        }
        Ok(())
    }

    async fn delete_cart(&mut self, id: CartId) -> Result<()> {
        sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM carts WHERE id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Cart lines
    // ═══════════════════════════════════════════════════════════════════

    async fn insert_cart_line(&mut self, line: &CartLine) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO cart_lines
                (id, cart_id, product_id, quantity, unit_price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(line.id.0)
        .bind(line.cart_id.0)
        .bind(line.product_id.0)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.created_at)
        .bind(line.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn cart_line(&mut self, id: CartLineId) -> Result<Option<CartLine>> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, cart_id, product_id, quantity, unit_price, created_at, updated_at
            FROM cart_lines
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(row.map(CartLine::from))
    }

    async fn cart_lines(&mut self, cart_id: CartId) -> Result<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, cart_id, product_id, quantity, unit_price, created_at, updated_at
            FROM cart_lines
            WHERE cart_id = $1
            ORDER BY created_at
            ",
        )
        .bind(cart_id.0)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(CartLine::from).collect())
    }

    async fn find_cart_line(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<Option<CartLine>> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, cart_id, product_id, quantity, unit_price, created_at, updated_at
            FROM cart_lines
            WHERE cart_id = $1 AND product_id = $2
            ",
        )
        .bind(cart_id.0)
        .bind(product_id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(row.map(CartLine::from))
    }

    async fn update_cart_line(&mut self, line: &CartLine) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE cart_lines
            SET quantity = $2, unit_price = $3, updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(line.id.0)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("cart line", line.id));
        }
        Ok(())
    }

    async fn delete_cart_line(&mut self, id: CartLineId) -> Result<()> {
        sqlx::query("DELETE FROM cart_lines WHERE id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_cart_lines(&mut self, cart_id: CartId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM cart_lines WHERE cart_id = $1")
            .bind(cart_id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Orders
    // ═══════════════════════════════════════════════════════════════════

    async fn insert_order(&mut self, order: &Order) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO orders (id, customer_id, status, total, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(order.id.0)
        .bind(order.customer_id.0)
        .bind(order.status.as_str())
        .bind(order.total)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn order(&mut self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, status, total, created_at, updated_at
            FROM orders
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        row.map(Order::try_from).transpose()
    }

    async fn orders_for_customer(&mut self, customer_id: CustomerId) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, customer_id, status, total, created_at, updated_at
            FROM orders
            WHERE customer_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(customer_id.0)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn set_order_status(&mut self, id: OrderId, status: OrderStatus) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET status = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .bind(status.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("order", id));
        }
        Ok(())
    }

    async fn set_order_total(&mut self, id: OrderId, total: Decimal) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE orders
            SET total = $2, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .bind(total)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("order", id));
        }
        Ok(())
    }

    async fn delete_order(&mut self, id: OrderId) -> Result<()> {
        sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Order lines
    // ═══════════════════════════════════════════════════════════════════

    async fn insert_order_line(&mut self, line: &OrderLine) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO order_lines
                (id, order_id, product_id, quantity, unit_price, subtotal, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(line.id.0)
        .bind(line.order_id.0)
        .bind(line.product_id.0)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.subtotal)
        .bind(line.created_at)
        .bind(line.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn order_line(&mut self, id: OrderLineId) -> Result<Option<OrderLine>> {
        let row = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT id, order_id, product_id, quantity, unit_price, subtotal,
                   created_at, updated_at
            FROM order_lines
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(row.map(OrderLine::from))
    }

    async fn order_lines(&mut self, order_id: OrderId) -> Result<Vec<OrderLine>> {
        let rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT id, order_id, product_id, quantity, unit_price, subtotal,
                   created_at, updated_at
            FROM order_lines
            WHERE order_id = $1
            ORDER BY created_at
            ",
        )
        .bind(order_id.0)
        .fetch_all(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(OrderLine::from).collect())
    }

    async fn find_order_line(
        &mut self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<Option<OrderLine>> {
        let row = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT id, order_id, product_id, quantity, unit_price, subtotal,
                   created_at, updated_at
            FROM order_lines
            WHERE order_id = $1 AND product_id = $2
            ",
        )
        .bind(order_id.0)
        .bind(product_id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        Ok(row.map(OrderLine::from))
    }

    async fn update_order_line(&mut self, line: &OrderLine) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE order_lines
            SET quantity = $2, unit_price = $3, subtotal = $4, updated_at = $5
            WHERE id = $1
            ",
        )
        .bind(line.id.0)
        .bind(line.quantity)
        .bind(line.unit_price)
        .bind(line.subtotal)
        .bind(line.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("order line", line.id));
        }
        Ok(())
    }

    async fn delete_order_line(&mut self, id: OrderLineId) -> Result<()> {
        sqlx::query("DELETE FROM order_lines WHERE id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete_order_lines(&mut self, order_id: OrderId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
            .bind(order_id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Payments
    // ═══════════════════════════════════════════════════════════════════

    async fn insert_payment(&mut self, payment: &Payment) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO payments
                (id, order_id, amount, method, status, settled_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(payment.id.0)
        .bind(payment.order_id.0)
        .bind(payment.amount)
        .bind(payment.method.as_str())
        .bind(payment.status.as_str())
        .bind(payment.settled_at)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            // The unique index on order_id backstops the one-payment
            // check when two creates race between check and insert.
            if let sqlx::Error::Database(db) = &e {
                if db.is_unique_violation() {
                    return Error::DuplicatePayment {
                        order_id: payment.order_id,
                    };
                }
            }
            db_err(e)
        })?;
        Ok(())
    }

    async fn payment(&mut self, id: PaymentId) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r"
            SELECT id, order_id, amount, method, status, settled_at, created_at, updated_at
            FROM payments
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        row.map(Payment::try_from).transpose()
    }

    async fn payment_for_order(&mut self, order_id: OrderId) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r"
            SELECT id, order_id, amount, method, status, settled_at, created_at, updated_at
            FROM payments
            WHERE order_id = $1
            ",
        )
        .bind(order_id.0)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;
        row.map(Payment::try_from).transpose()
    }

    async fn update_payment(&mut self, payment: &Payment) -> Result<()> {
        let result = sqlx::query(
            r"
            UPDATE payments
            SET status = $2, settled_at = $3, updated_at = $4
            WHERE id = $1
            ",
        )
        .bind(payment.id.0)
        .bind(payment.status.as_str())
        .bind(payment.settled_at)
        .bind(payment.updated_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("payment", payment.id));
        }
        Ok(())
    }

    async fn delete_payment(&mut self, id: PaymentId) -> Result<()> {
        sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id.0)
            .execute(&mut *self.tx)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}
