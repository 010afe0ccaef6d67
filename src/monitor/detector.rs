//! Change detection and falling-edge tracking.
//!
//! A notification means "an editing burst just ended": the previous tick saw
//! the board change and this tick saw it unchanged. Continuous editing and a
//! board nobody touches both stay silent.

use crate::board::Snapshot;

/// Byte-exact comparison of two successive snapshots
pub fn differs(previous: &Snapshot, current: &Snapshot) -> bool {
    previous.as_bytes() != current.as_bytes()
}

/// Falling edge: changes were in progress and have now stopped
pub fn is_settled(changes_in_progress: bool, differs: bool) -> bool {
    changes_in_progress && !differs
}

/// Outcome of feeding one snapshot to an [`EditTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// First snapshot ever seen; nothing to compare against
    Baseline,
    /// Same as last tick, no editing in progress
    Unchanged,
    /// Content differs from last tick
    Editing,
    /// Same as last tick right after an editing tick
    Settled,
}

/// Previous snapshot plus the `changes_in_progress` flag of one board
#[derive(Debug, Clone, Default)]
pub struct EditTracker {
    previous: Option<Snapshot>,
    changes_in_progress: bool,
}

impl EditTracker {
    /// Start from an initial snapshot, or from nothing if it could not be fetched
    pub fn new(initial: Option<Snapshot>) -> Self {
        Self {
            previous: initial,
            changes_in_progress: false,
        }
    }

    pub fn has_baseline(&self) -> bool {
        self.previous.is_some()
    }

    pub fn changes_in_progress(&self) -> bool {
        self.changes_in_progress
    }

    pub fn observe(&mut self, current: Snapshot) -> Transition {
        let Some(previous) = self.previous.as_ref() else {
            self.previous = Some(current);
            return Transition::Baseline;
        };

        let changed = differs(previous, &current);
        let settled = is_settled(self.changes_in_progress, changed);
        self.changes_in_progress = changed;
        self.previous = Some(current);

        if settled {
            Transition::Settled
        } else if changed {
            Transition::Editing
        } else {
            Transition::Unchanged
        }
    }
}
