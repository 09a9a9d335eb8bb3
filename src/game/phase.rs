//! Turn phases and the phase sequencer

use crate::core::Side;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The twelve phases of a turn, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Untap,
    Upkeep,
    Draw,
    Main1,
    CombatBegin,
    CombatAttackers,
    CombatBlockers,
    CombatDamage,
    CombatEnd,
    Main2,
    End,
    Cleanup,
}

impl Phase {
    pub const ALL: [Phase; 12] = [
        Phase::Untap,
        Phase::Upkeep,
        Phase::Draw,
        Phase::Main1,
        Phase::CombatBegin,
        Phase::CombatAttackers,
        Phase::CombatBlockers,
        Phase::CombatDamage,
        Phase::CombatEnd,
        Phase::Main2,
        Phase::End,
        Phase::Cleanup,
    ];

    /// Get the next phase within the same turn
    pub fn next(&self) -> Option<Phase> {
        match self {
            Phase::Untap => Some(Phase::Upkeep),
            Phase::Upkeep => Some(Phase::Draw),
            Phase::Draw => Some(Phase::Main1),
            Phase::Main1 => Some(Phase::CombatBegin),
            Phase::CombatBegin => Some(Phase::CombatAttackers),
            Phase::CombatAttackers => Some(Phase::CombatBlockers),
            Phase::CombatBlockers => Some(Phase::CombatDamage),
            Phase::CombatDamage => Some(Phase::CombatEnd),
            Phase::CombatEnd => Some(Phase::Main2),
            Phase::Main2 => Some(Phase::End),
            Phase::End => Some(Phase::Cleanup),
            Phase::Cleanup => None, // End of turn
        }
    }

    /// Successor in the total order, wrapping cleanup to untap
    pub fn successor(&self) -> Phase {
        self.next().unwrap_or(Phase::Untap)
    }

    pub fn is_main(&self) -> bool {
        matches!(self, Phase::Main1 | Phase::Main2)
    }

    pub fn is_combat(&self) -> bool {
        matches!(
            self,
            Phase::CombatBegin
                | Phase::CombatAttackers
                | Phase::CombatBlockers
                | Phase::CombatDamage
                | Phase::CombatEnd
        )
    }

    /// Phases where a resource can be committed from hand
    pub fn allows_resource_commit(&self) -> bool {
        matches!(self, Phase::Draw | Phase::Main1 | Phase::Main2)
    }

    /// Who receives priority when this phase is entered
    ///
    /// Always the active player, except in blocker declaration where the
    /// defending player must act first.
    pub fn first_priority(&self, active: Side) -> Side {
        match self {
            Phase::CombatBlockers => active.other(),
            _ => active,
        }
    }

    /// Wire tag used by collaborators (`combat_attackers` etc.)
    pub fn tag(&self) -> &'static str {
        match self {
            Phase::Untap => "untap",
            Phase::Upkeep => "upkeep",
            Phase::Draw => "draw",
            Phase::Main1 => "main1",
            Phase::CombatBegin => "combat_begin",
            Phase::CombatAttackers => "combat_attackers",
            Phase::CombatBlockers => "combat_blockers",
            Phase::CombatDamage => "combat_damage",
            Phase::CombatEnd => "combat_end",
            Phase::Main2 => "main2",
            Phase::End => "end",
            Phase::Cleanup => "cleanup",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Phase::Untap => "Untap",
            Phase::Upkeep => "Upkeep",
            Phase::Draw => "Draw",
            Phase::Main1 => "Main Phase",
            Phase::CombatBegin => "Beginning of Combat",
            Phase::CombatAttackers => "Declare Attackers",
            Phase::CombatBlockers => "Declare Blockers",
            Phase::CombatDamage => "Combat Damage",
            Phase::CombatEnd => "End of Combat",
            Phase::Main2 => "Second Main Phase",
            Phase::End => "End Step",
            Phase::Cleanup => "Cleanup",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A new turn began: who is active and the turn number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnChange {
    pub active_player: Side,
    pub turn_number: u32,
}

/// Result of one `next_phase` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseAdvance {
    pub from: Phase,
    pub to: Phase,
    /// Set only when the call wrapped cleanup into the next player's untap
    pub turn_change: Option<TurnChange>,
}

/// Represents the current turn structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnStructure {
    /// Current turn number (starts at 1)
    pub turn_number: u32,

    pub phase: Phase,

    /// Whose turn it is
    pub active_player: Side,

    /// Mirrors `active_player` except during the defender's reactive window
    pub current_player: Side,

    /// The side whose turns increment the turn number
    pub first_player: Side,
}

impl TurnStructure {
    pub fn new(first_player: Side) -> Self {
        TurnStructure {
            turn_number: 1,
            phase: Phase::Untap,
            active_player: first_player,
            current_player: first_player,
            first_player,
        }
    }

    /// Advance to the next phase
    ///
    /// Every transition only updates `phase`, except cleanup: it ends the
    /// turn (swapping the active player, bumping the turn number when the
    /// new active player is the first player) and returns untap. The caller
    /// resets the turn clock when `turn_change` is set.
    pub fn next_phase(&mut self) -> PhaseAdvance {
        let from = self.phase;
        let (to, turn_change) = match from.next() {
            Some(next) => (next, None),
            None => (Phase::Untap, Some(self.end_turn())),
        };
        self.phase = to;
        self.current_player = self.current_for(to);
        PhaseAdvance { from, to, turn_change }
    }

    /// Hand the turn to the other player without touching `phase`
    pub fn end_turn(&mut self) -> TurnChange {
        self.active_player = self.active_player.other();
        self.current_player = self.active_player;
        if self.active_player == self.first_player {
            self.turn_number += 1;
        }
        TurnChange {
            active_player: self.active_player,
            turn_number: self.turn_number,
        }
    }

    /// Jump straight to the next player's untap (forced timeout path)
    pub fn force_turn_end(&mut self) -> PhaseAdvance {
        let from = self.phase;
        let turn_change = self.end_turn();
        self.phase = Phase::Untap;
        PhaseAdvance {
            from,
            to: Phase::Untap,
            turn_change: Some(turn_change),
        }
    }

    fn current_for(&self, phase: Phase) -> Side {
        match phase {
            Phase::CombatBlockers => self.active_player.other(),
            _ => self.active_player,
        }
    }
}
