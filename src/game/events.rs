//! Notifications published to collaborators (UI, input layer, logs)
//!
//! The core never reads these back; they describe what happened.

use crate::core::{CardId, Side};
use crate::game::phase::Phase;
use crate::game::priority::StackEntry;
use crate::game::state::GameOutcome;
use crate::game::GameAction;
use serde::{Deserialize, Serialize};

/// Presentation class of an action-required prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Phase,
    Priority,
    Timer,
    ActionRequired,
    Waiting,
}

/// A descriptive prompt for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPrompt {
    pub label: String,
    pub kind: PromptKind,
    pub auto_dismiss_ms: Option<u64>,
}

impl ActionPrompt {
    pub fn new(label: impl Into<String>, kind: PromptKind) -> Self {
        ActionPrompt {
            label: label.into(),
            kind,
            auto_dismiss_ms: None,
        }
    }

    pub fn dismiss_after(mut self, ms: u64) -> Self {
        self.auto_dismiss_ms = Some(ms);
        self
    }

    /// Prompt shown when `phase` is entered, if any
    ///
    /// The blocker prompt only appears while the defender holds the
    /// reactive window.
    pub fn for_phase(phase: Phase, active: Side, current: Side) -> Option<Self> {
        let prompt = match phase {
            Phase::Untap => ActionPrompt::new("Untap your permanents", PromptKind::ActionRequired),
            Phase::Draw => ActionPrompt::new("Draw a card", PromptKind::ActionRequired),
            Phase::Main1 => ActionPrompt::new("Play spells and abilities", PromptKind::Waiting),
            Phase::CombatBegin => ActionPrompt::new("Enter combat?", PromptKind::ActionRequired),
            Phase::CombatAttackers => {
                ActionPrompt::new("Declare attackers", PromptKind::ActionRequired)
            }
            Phase::CombatBlockers if current != active => {
                ActionPrompt::new("Declare blockers", PromptKind::ActionRequired)
            }
            Phase::Main2 => ActionPrompt::new("Second main phase", PromptKind::Waiting),
            Phase::End => ActionPrompt::new("End turn?", PromptKind::ActionRequired),
            _ => return None,
        };
        Some(prompt)
    }

    pub fn resolving() -> Self {
        ActionPrompt::new("Resolving...", PromptKind::Waiting).dismiss_after(1000)
    }

    pub fn time_expired() -> Self {
        ActionPrompt::new("Time expired!", PromptKind::Timer).dismiss_after(3000)
    }
}

/// Everything the core reports to the outside
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    GameStarted { first_player: Side },
    PhaseChanged { from: Phase, to: Phase },
    PriorityChanged { holder: Side },
    TurnChanged { active_player: Side, turn_number: u32 },
    TimeWarning { seconds_remaining: u32 },
    ActionRequired(ActionPrompt),
    ActionTaken { side: Side, action: GameAction },
    StackResolved { entry: StackEntry },
    /// Stack entry dropped without resolving (forced end of turn)
    StackDiscarded { entry: StackEntry },
    CardDrawn { side: Side },
    LifeChanged { side: Side, life: i32, delta: i32 },
    CreatureDestroyed { card: CardId, owner: Side },
    TurnTimedOut { side: Side },
    Emote { side: Side, text: String },
    GameOver(GameOutcome),
}

impl GameEvent {
    /// Short category name used by the logger
    pub fn category(&self) -> &'static str {
        match self {
            GameEvent::GameStarted { .. } | GameEvent::GameOver(_) => "game",
            GameEvent::PhaseChanged { .. } | GameEvent::TurnChanged { .. } => "phase",
            GameEvent::PriorityChanged { .. } | GameEvent::ActionTaken { .. } => "priority",
            GameEvent::TimeWarning { .. } | GameEvent::TurnTimedOut { .. } => "clock",
            GameEvent::StackResolved { .. } | GameEvent::StackDiscarded { .. } => "stack",
            GameEvent::LifeChanged { .. } | GameEvent::CreatureDestroyed { .. } => "combat",
            GameEvent::CardDrawn { .. } | GameEvent::ActionRequired(_) => "prompt",
            GameEvent::Emote { .. } => "emote",
        }
    }
}
