//! The order-fulfillment transaction engine.
//!
//! This crate owns every workflow that mutates more than one row at a
//! time: cart checkout, order-line mutation, cancellation, and payment.
//! All of them run against the [`store::Store`] seam, which hands out an
//! explicit unit-of-work handle per request so that every reserve,
//! release, insert, and total recomputation inside one workflow provably
//! shares a single commit/rollback boundary.
//!
//! Stock is the only resource touched by more than one workflow, so all
//! of its mutation funnels through [`ledger`], which re-reads the
//! product row under a lock immediately before every decrement.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod carts;
pub mod catalog;
pub mod config;
pub mod ledger;
pub mod orders;
pub mod payments;
pub mod store;

pub use carts::CartService;
pub use catalog::CatalogService;
pub use config::EngineConfig;
pub use orders::OrderService;
pub use payments::PaymentService;
pub use store::{Store, UnitOfWork};
