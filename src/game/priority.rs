//! Priority passing and the pending-effect stack
//!
//! Two consecutive passes either resolve the top of the stack or, when the
//! stack is empty, end the phase. Any non-pass action resets the count.

use crate::core::{CardId, Side};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// What a stack entry does when it resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackEffect {
    /// The source card enters its controller's field
    Summon,
    /// The source card's effect happens, then it goes to the graveyard
    Effect { targets: SmallVec<[CardId; 2]> },
}

/// A spell waiting on the stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    /// Sequence number, unique within a match
    pub id: u32,
    pub source: CardId,
    pub controller: Side,
    pub effect: StackEffect,
}

/// Result of passing priority
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    /// Priority moved to the other side; nothing else happens yet
    Passed { to: Side },
    /// Both sides passed with a non-empty stack; this entry was popped
    Resolve(StackEntry),
    /// Both sides passed with an empty stack; the phase must advance
    AdvancePhase,
}

/// Priority holder, consecutive-pass counter, and the stack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityState {
    priority: Side,
    passed_in_succession: u8,
    stack: Vec<StackEntry>,
    next_entry_id: u32,
}

impl PriorityState {
    pub fn new(holder: Side) -> Self {
        PriorityState {
            priority: holder,
            passed_in_succession: 0,
            stack: Vec::new(),
            next_entry_id: 0,
        }
    }

    pub fn holder(&self) -> Side {
        self.priority
    }

    pub fn passed_in_succession(&self) -> u8 {
        self.passed_in_succession
    }

    pub fn stack(&self) -> &[StackEntry] {
        &self.stack
    }

    pub fn stack_is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Flip priority and count the pass
    ///
    /// On the second consecutive pass the counter is reset before returning,
    /// so the caller settles exactly one resolution or phase advance.
    pub fn pass(&mut self) -> PassOutcome {
        self.priority = self.priority.other();
        self.passed_in_succession += 1;
        debug_assert!(self.passed_in_succession <= 2, "pass counter overflow");

        if self.passed_in_succession < 2 {
            return PassOutcome::Passed { to: self.priority };
        }

        self.passed_in_succession = 0;
        match self.stack.pop() {
            Some(entry) => PassOutcome::Resolve(entry),
            None => PassOutcome::AdvancePhase,
        }
    }

    /// A non-pass action was taken; priority stays where it is
    pub fn record_action(&mut self) {
        self.passed_in_succession = 0;
    }

    /// Give priority to `side` on phase entry
    pub fn grant(&mut self, side: Side) {
        self.priority = side;
        self.passed_in_succession = 0;
    }

    pub fn push(&mut self, source: CardId, controller: Side, effect: StackEffect) -> &StackEntry {
        let id = self.next_entry_id;
        self.next_entry_id += 1;
        self.stack.push(StackEntry {
            id,
            source,
            controller,
            effect,
        });
        &self.stack[self.stack.len() - 1]
    }

    /// Drop every pending entry (forced end of turn)
    pub fn clear_stack(&mut self) -> Vec<StackEntry> {
        self.passed_in_succession = 0;
        std::mem::take(&mut self.stack)
    }
}
