//! Fixture builders.
//!
//! Small constructors for seeding the memory store with realistic rows.

use storefront_core::{Cart, CartLine, CartLineId, CartStatus, CustomerId, Product, ProductId};
use chrono::Utc;
use rust_decimal::Decimal;

/// A product with the given price and stock.
#[must_use]
pub fn product(name: &str, price: Decimal, stock: i32) -> Product {
    let now = Utc::now();
    Product {
        id: ProductId::new(),
        name: name.to_string(),
        description: None,
        price,
        stock,
        created_at: now,
        updated_at: now,
    }
}

/// An active cart for a fresh customer.
#[must_use]
pub fn active_cart() -> Cart {
    Cart::open(CustomerId::new())
}

/// A cart in the given status for a fresh customer.
#[must_use]
pub fn cart_with_status(status: CartStatus) -> Cart {
    Cart {
        status,
        ..Cart::open(CustomerId::new())
    }
}

/// A line putting `quantity` of `product` into `cart` at the product's
/// own price.
#[must_use]
pub fn cart_line(cart: &Cart, product: &Product, quantity: i32) -> CartLine {
    let now = Utc::now();
    CartLine {
        id: CartLineId::new(),
        cart_id: cart.id,
        product_id: product.id,
        quantity,
        unit_price: product.price,
        created_at: now,
        updated_at: now,
    }
}
