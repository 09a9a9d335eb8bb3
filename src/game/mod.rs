//! Core game state and turn structure

pub mod actions;
pub mod clock;
pub mod combat;
pub mod controller;
pub mod emote;
pub mod events;
pub mod game_init;
pub mod game_loop;
pub mod heuristic_controller;
pub mod logger;
pub mod phase;
pub mod priority;
pub mod profile;
pub mod scheduler;
pub mod state;

pub use actions::{ActionDispatcher, GameAction};
pub use clock::{ClockEvent, TurnClock};
pub use combat::CombatState;
pub use controller::{
    GameStateView, ManualController, PlayerController, ScriptedController, ZeroController,
};
pub use emote::{EmoteBehavior, EmoteTrigger};
pub use events::{ActionPrompt, GameEvent, PromptKind};
pub use game_init::{CardTemplate, DeckList, GameInitializer};
pub use game_loop::{GameLoop, GameResult};
pub use heuristic_controller::HeuristicController;
pub use logger::{GameLogger, OutputFormat, OutputMode, VerbosityLevel};
pub use phase::{Phase, TurnStructure};
pub use priority::{PassOutcome, PriorityState, StackEffect, StackEntry};
pub use profile::{DecisionKind, DecisionParameterProfile, Difficulty};
pub use scheduler::{DecisionRequestId, DecisionScheduler};
pub use state::{GameEndReason, GameOutcome, GameState};
