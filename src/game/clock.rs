//! Per-turn countdown clock
//!
//! The clock ticks once per second independently of phases and priority.
//! Each warning threshold fires at most once per turn, and reaching zero
//! reports expiry exactly once until the clock is reset.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub const DEFAULT_TURN_BUDGET_SECS: u32 = 300;
pub const DEFAULT_WARNING_THRESHOLDS_SECS: [u32; 3] = [60, 30, 10];

/// Something the clock wants reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockEvent {
    Warning { seconds_remaining: u32 },
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnClock {
    budget_secs: u32,
    remaining_secs: u32,
    thresholds: SmallVec<[u32; 4]>,
    fired: SmallVec<[u32; 4]>,
    expired: bool,
}

impl TurnClock {
    pub fn new(budget_secs: u32, thresholds: &[u32]) -> Self {
        TurnClock {
            budget_secs,
            remaining_secs: budget_secs,
            thresholds: thresholds.iter().copied().collect(),
            fired: SmallVec::new(),
            expired: false,
        }
    }

    pub fn budget_secs(&self) -> u32 {
        self.budget_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Count down one second
    pub fn tick(&mut self) -> SmallVec<[ClockEvent; 2]> {
        let mut events = SmallVec::new();
        if self.expired {
            return events;
        }

        let before = self.remaining_secs;
        self.remaining_secs = self.remaining_secs.saturating_sub(1);

        for &threshold in &self.thresholds {
            let crossed = before > threshold && self.remaining_secs <= threshold;
            if crossed && threshold > 0 && !self.fired.contains(&threshold) {
                self.fired.push(threshold);
                events.push(ClockEvent::Warning {
                    seconds_remaining: threshold,
                });
            }
        }

        if self.remaining_secs == 0 {
            self.expired = true;
            events.push(ClockEvent::Expired);
        }
        events
    }

    /// Deliver a burst of ticks at once
    pub fn tick_many(&mut self, ticks: u32) -> Vec<ClockEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(self.tick());
        }
        events
    }

    /// Re-arm for a new turn: full budget, every threshold enabled again
    pub fn reset(&mut self) {
        self.remaining_secs = self.budget_secs;
        self.fired.clear();
        self.expired = false;
    }
}

impl Default for TurnClock {
    fn default() -> Self {
        TurnClock::new(DEFAULT_TURN_BUDGET_SECS, &DEFAULT_WARNING_THRESHOLDS_SECS)
    }
}
