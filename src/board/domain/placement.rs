//! Ordering allocation for newly created tasks.

use serde::{Deserialize, Serialize};

/// Display order and creation sequence assigned to a task at insertion.
///
/// `order` is the task's position within its project at allocation time;
/// `sequence` is a strictly increasing per-project counter that is never
/// reused, even after deletions, and serves as a stable creation-order
/// tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskPlacement {
    order: u32,
    sequence: u64,
}

impl TaskPlacement {
    /// Allocates the placement for the next task in a project.
    ///
    /// `sequences` must be the sequence numbers of every task currently in
    /// the project. The new task's order equals the current task count and
    /// its sequence is one greater than the current maximum (1 for an empty
    /// project).
    ///
    /// Callers are responsible for invoking this atomically with respect to
    /// concurrent creations on the same project: the read of existing
    /// sequences and the insert of the allocated placement must not
    /// interleave with another allocation.
    #[must_use]
    pub fn allocate(sequences: impl IntoIterator<Item = u64>) -> Self {
        let mut count: u32 = 0;
        let mut max_sequence: u64 = 0;
        for sequence in sequences {
            count = count.saturating_add(1);
            max_sequence = max_sequence.max(sequence);
        }

        Self {
            order: count,
            sequence: max_sequence.saturating_add(1),
        }
    }

    /// Reconstructs a placement from persisted values.
    #[must_use]
    pub const fn from_parts(order: u32, sequence: u64) -> Self {
        Self { order, sequence }
    }

    /// Returns the display order within the project.
    #[must_use]
    pub const fn order(self) -> u32 {
        self.order
    }

    /// Returns the per-project creation sequence number.
    #[must_use]
    pub const fn sequence(self) -> u64 {
        self.sequence
    }
}
