//! Cancellable "thinking" timers for automated controllers
//!
//! Each pending decision is keyed by a `DecisionRequestId`. When the
//! decision point it was scheduled for goes away (an action was taken,
//! the turn timed out) the request is cancelled and can never fire.

use crate::core::Side;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecisionRequestId(u64);

impl DecisionRequestId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for DecisionRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledDecision {
    pub id: DecisionRequestId,
    pub side: Side,
    pub due_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct DecisionScheduler {
    next_id: u64,
    pending: BTreeMap<DecisionRequestId, ScheduledDecision>,
}

impl DecisionScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, side: Side, due_ms: u64) -> DecisionRequestId {
        let id = DecisionRequestId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, ScheduledDecision { id, side, due_ms });
        id
    }

    /// Returns false if the request already fired or was cancelled
    pub fn cancel(&mut self, id: DecisionRequestId) -> bool {
        self.pending.remove(&id).is_some()
    }

    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    pub fn is_pending(&self, id: DecisionRequestId) -> bool {
        self.pending.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Earliest due time among pending requests
    pub fn next_due(&self) -> Option<u64> {
        self.pending.values().map(|d| d.due_ms).min()
    }

    /// Pop the earliest request due at or before `now_ms`
    ///
    /// Ties go to the request scheduled first.
    pub fn take_due(&mut self, now_ms: u64) -> Option<ScheduledDecision> {
        let id = self
            .pending
            .values()
            .filter(|d| d.due_ms <= now_ms)
            .min_by_key(|d| (d.due_ms, d.id))?
            .id;
        self.pending.remove(&id)
    }
}
