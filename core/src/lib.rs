//! Domain model for the Storefront order-fulfillment engine.
//!
//! This crate holds everything that is pure: entity records, id newtypes,
//! the closed status enums with their transition tables, subtotal/total
//! arithmetic, and the error taxonomy shared by every other crate in the
//! workspace. It performs no I/O and has no async dependencies.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod ids;
pub mod model;
pub mod status;
pub mod totals;

pub use error::{Error, Result};
pub use ids::{CartId, CartLineId, CustomerId, OrderId, OrderLineId, PaymentId, ProductId};
pub use model::{Cart, CartLine, Order, OrderLine, Payment, Product};
pub use status::{CartStatus, OrderStatus, PaymentMethod, PaymentStatus};
