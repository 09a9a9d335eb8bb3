//! Player controller trait and game state view
//!
//! The game loop asks a controller for one action whenever its side holds
//! priority. Controllers inspect a read-only view of the state; only the
//! dispatcher applies what they return.

use crate::core::{Card, CardId, Side};
use crate::game::events::GameEvent;
use crate::game::phase::Phase;
use crate::game::priority::StackEntry;
use crate::game::profile::Difficulty;
use crate::game::{CombatState, GameAction, GameLogger, GameState};
use std::collections::VecDeque;

/// Read-only view of game state for one side
pub struct GameStateView<'a> {
    game: &'a GameState,
    side: Side,
}

impl<'a> GameStateView<'a> {
    pub fn new(game: &'a GameState, side: Side) -> Self {
        GameStateView { game, side }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn opponent_side(&self) -> Side {
        self.side.other()
    }

    pub fn phase(&self) -> Phase {
        self.game.turn.phase
    }

    pub fn turn_number(&self) -> u32 {
        self.game.turn.turn_number
    }

    pub fn active_player(&self) -> Side {
        self.game.turn.active_player
    }

    pub fn current_player(&self) -> Side {
        self.game.turn.current_player
    }

    /// It is this side's turn
    pub fn is_active(&self) -> bool {
        self.game.turn.active_player == self.side
    }

    pub fn holds_priority(&self) -> bool {
        self.game.priority.holder() == self.side
    }

    pub fn stack(&self) -> &[StackEntry] {
        self.game.priority.stack()
    }

    pub fn stack_is_empty(&self) -> bool {
        self.game.priority.stack_is_empty()
    }

    pub fn combat(&self) -> &CombatState {
        &self.game.combat
    }

    pub fn card(&self, id: CardId) -> Option<&'a Card> {
        self.game.cards.get(id).ok()
    }

    pub fn hand(&self) -> &'a [CardId] {
        &self.game.zones(self.side).hand.cards
    }

    pub fn field(&self) -> &'a [CardId] {
        &self.game.zones(self.side).field.cards
    }

    pub fn opponent_field(&self) -> &'a [CardId] {
        &self.game.zones(self.side.other()).field.cards
    }

    pub fn resource_row(&self) -> &'a [CardId] {
        &self.game.zones(self.side).resource_row.cards
    }

    pub fn untapped_resources(&self) -> Vec<CardId> {
        self.game.untapped_resources(self.side)
    }

    /// Cards in hand, resolved to their data, in hand order
    pub fn hand_cards(&self) -> impl Iterator<Item = &'a Card> + '_ {
        self.hand().iter().filter_map(|id| self.card(*id))
    }

    pub fn creatures(&self) -> impl Iterator<Item = &'a Card> + 'a {
        self.game.creatures(self.side)
    }

    pub fn opponent_creatures(&self) -> impl Iterator<Item = &'a Card> + 'a {
        self.game.creatures(self.side.other())
    }

    pub fn life(&self) -> i32 {
        self.game.player(self.side).life
    }

    pub fn opponent_life(&self) -> i32 {
        self.game.player(self.side.other()).life
    }

    pub fn resource_committed(&self) -> bool {
        self.game.player(self.side).resource_committed
    }

    pub fn is_game_over(&self) -> bool {
        self.game.is_game_over()
    }

    pub fn logger(&self) -> &GameLogger {
        &self.game.logger
    }
}

/// Player controller trait
///
/// `Send` so a match can be moved onto a runtime task.
pub trait PlayerController: Send {
    fn side(&self) -> Side;

    /// Automated controllers are scheduled by the game loop; manual ones
    /// wait for external submissions.
    fn is_automated(&self) -> bool {
        true
    }

    /// Milliseconds of simulated thinking before `choose_action` is called
    fn decision_delay_ms(&mut self, _view: &GameStateView) -> u64 {
        0
    }

    /// Choose one action while holding priority; `None` passes
    fn choose_action(&mut self, view: &GameStateView) -> Option<GameAction>;

    /// Observe a published event; may answer with an emote line
    fn observe(&mut self, _event: &GameEvent, _now_ms: u64) -> Option<String> {
        None
    }

    /// Replace the decision profile; false when the controller has none
    fn set_difficulty(&mut self, _difficulty: Difficulty, _seed: u64) -> bool {
        false
    }

    fn on_game_end(&mut self, _view: &GameStateView, _won: bool) {}
}

/// A seat driven from outside through `GameLoop::submit`
pub struct ManualController {
    side: Side,
}

impl ManualController {
    pub fn new(side: Side) -> Self {
        ManualController { side }
    }
}

impl PlayerController for ManualController {
    fn side(&self) -> Side {
        self.side
    }

    fn is_automated(&self) -> bool {
        false
    }

    fn choose_action(&mut self, _view: &GameStateView) -> Option<GameAction> {
        None
    }
}

/// Always passes; useful for driving the engine in tests and benchmarks
pub struct ZeroController {
    side: Side,
}

impl ZeroController {
    pub fn new(side: Side) -> Self {
        ZeroController { side }
    }
}

impl PlayerController for ZeroController {
    fn side(&self) -> Side {
        self.side
    }

    fn choose_action(&mut self, _view: &GameStateView) -> Option<GameAction> {
        None
    }
}

/// Plays a fixed script of actions, then passes forever
pub struct ScriptedController {
    side: Side,
    script: VecDeque<GameAction>,
    delay_ms: u64,
}

impl ScriptedController {
    pub fn new(side: Side, script: Vec<GameAction>) -> Self {
        ScriptedController {
            side,
            script: script.into(),
            delay_ms: 0,
        }
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl PlayerController for ScriptedController {
    fn side(&self) -> Side {
        self.side
    }

    fn decision_delay_ms(&mut self, _view: &GameStateView) -> u64 {
        self.delay_ms
    }

    fn choose_action(&mut self, view: &GameStateView) -> Option<GameAction> {
        let action = self.script.pop_front();
        if let Some(action) = &action {
            view.logger().controller_choice("SCRIPTED", &format!("{} {action}", self.side));
        }
        action
    }
}
