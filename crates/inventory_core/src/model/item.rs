//! Item record.
//!
//! # Responsibility
//! - Hold the four persisted attributes of one inventory entry.
//!
//! # Invariants
//! - `id == NEW_ITEM_ID` means "not persisted yet"; storage assigns a fresh
//!   id on insert.
//! - Once assigned, `id` never changes for the stored row.
//! - Equality is structural over all four fields.

use serde::{Deserialize, Serialize};

/// Primary key of an item row.
pub type ItemId = i64;

/// Sentinel id asking storage to assign a new unique id on insert.
pub const NEW_ITEM_ID: ItemId = 0;

/// One inventory entry.
///
/// `price` and `quantity` are expected to be non-negative, but nothing
/// below the caller enforces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Row id; `NEW_ITEM_ID` until persisted.
    #[serde(default)]
    pub id: ItemId,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

impl Item {
    /// Creates an unsaved item; storage picks the id on insert.
    pub fn new(name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self::with_id(NEW_ITEM_ID, name, price, quantity)
    }

    /// Creates an item with a caller-provided id.
    ///
    /// Used for updates/deletes of known rows and for explicit-key inserts.
    pub fn with_id(id: ItemId, name: impl Into<String>, price: f64, quantity: i64) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            quantity,
        }
    }

    /// Returns whether this item still carries the "assign on insert" sentinel.
    pub fn is_unsaved(&self) -> bool {
        self.id == NEW_ITEM_ID
    }
}
