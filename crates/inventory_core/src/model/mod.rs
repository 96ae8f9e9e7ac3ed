//! Inventory domain model.
//!
//! # Responsibility
//! - Define the record persisted in the `items` table.
//!
//! # Invariants
//! - `id` is the only identity; all other fields are plain values.
//! - Field ranges are not validated here; callers own that policy.

pub mod item;
