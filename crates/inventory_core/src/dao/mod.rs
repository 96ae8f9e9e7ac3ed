//! Data access objects over the inventory store.
//!
//! # Responsibility
//! - Translate typed item operations into SQL.
//! - Expose read queries as live sequences fed by table invalidation.
//!
//! # Invariants
//! - Every write commits on its own; there is no cross-call batching.
//! - Table observers are notified only after a write changed at least one row.

pub mod item_dao;
