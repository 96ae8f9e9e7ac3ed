//! Table-level change notification for live queries.
//!
//! # Responsibility
//! - Keep one generation counter per observed table.
//! - Wake every live query observing a table after a committed change.
//!
//! # Invariants
//! - Generations only grow; a woken observer re-reads current state, so it
//!   never sees a snapshot older than one it already delivered.
//! - Several commits between two reads coalesce into one wake-up.

use log::debug;
use tokio::sync::watch;

/// Tables that live queries can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Table {
    Items,
}

impl Table {
    pub(crate) const ALL: [Table; 1] = [Table::Items];

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Items => crate::db::schema::ITEMS_TABLE,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Items => 0,
        }
    }
}

/// Broadcasts "table changed" generations to live queries.
pub(crate) struct InvalidationTracker {
    generations: [watch::Sender<u64>; Table::ALL.len()],
}

impl InvalidationTracker {
    pub(crate) fn new() -> Self {
        Self {
            generations: Table::ALL.map(|_| watch::channel(0).0),
        }
    }

    /// Returns a receiver that has already seen the current generation.
    pub(crate) fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.generations[table.index()].subscribe()
    }

    /// Bumps the generation of `table` and wakes its observers.
    pub(crate) fn invalidate(&self, table: Table) {
        let sender = &self.generations[table.index()];
        sender.send_modify(|generation| *generation += 1);
        debug!(
            "event=table_invalidated module=db table={} generation={} observers={}",
            table.name(),
            *sender.borrow(),
            sender.receiver_count()
        );
    }

    pub(crate) fn invalidate_all(&self) {
        for table in Table::ALL {
            self.invalidate(table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{InvalidationTracker, Table};

    #[test]
    fn invalidate_bumps_generation_without_observers() {
        let tracker = InvalidationTracker::new();
        tracker.invalidate(Table::Items);
        tracker.invalidate(Table::Items);
        assert_eq!(*tracker.subscribe(Table::Items).borrow(), 2);
    }

    #[test]
    fn subscriber_sees_change_after_invalidate() {
        let tracker = InvalidationTracker::new();
        let receiver = tracker.subscribe(Table::Items);
        assert!(!receiver.has_changed().unwrap());

        tracker.invalidate_all();
        assert!(receiver.has_changed().unwrap());
    }
}
