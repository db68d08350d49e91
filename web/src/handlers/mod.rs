//! HTTP handlers, one module per resource.

pub mod carts;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
