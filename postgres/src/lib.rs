//! PostgreSQL implementation of the engine's storage seam.
//!
//! [`PgStore`] hands out one [`PgUnitOfWork`] per request, each backed by
//! a real transaction. Stock re-checks use `SELECT ... FOR UPDATE` so
//! concurrent reservations of the same product serialize on its row.

mod rows;
mod store;

pub use store::{PgStore, PgUnitOfWork};
