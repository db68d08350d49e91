//! Test support for the Storefront engine.
//!
//! Provides [`MemoryStore`], an in-memory implementation of the engine's
//! store seam, and fixture builders for seeding it. The memory store
//! serializes whole units of work behind one lock and applies staged
//! changes on commit only, so rollback semantics and the concurrency
//! scenarios behave like the real database, just coarser.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod memory;

pub use memory::{MemoryStore, MemoryUnitOfWork};
