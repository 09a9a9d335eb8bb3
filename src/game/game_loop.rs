//! Game loop implementation
//!
//! Drives one match on a virtual millisecond clock. Two kinds of work are
//! scheduled: the turn clock's one-second ticks, and the "thinking" timers
//! of automated controllers. Whichever is due first runs next, and every
//! state change settles completely before the next one starts.
//!
//! A thinking timer belongs to one decision point. As soon as anything moves
//! the game off that point (an action, a pass, a phase change, a timeout)
//! the timer is cancelled and a fresh one is scheduled for whoever holds
//! priority now.

/// Macro for conditional logging that avoids allocation when feature is disabled
///
/// When verbose-logging feature is disabled, this becomes a no-op at compile time,
/// eliminating the format! allocations on the scheduling hot path.
macro_rules! log_if_verbose {
    ($self:expr, $($arg:tt)*) => {
        #[cfg(feature = "verbose-logging")]
        {
            $self.game.logger.verbose(&format!($($arg)*));
        }
        #[cfg(not(feature = "verbose-logging"))]
        {
            let _ = &$self;
        }
    };
}

use crate::config::MatchConfig;
use crate::core::Side;
use crate::game::clock::{ClockEvent, TurnClock};
use crate::game::controller::{GameStateView, PlayerController};
use crate::game::events::GameEvent;
use crate::game::profile::Difficulty;
use crate::game::scheduler::{DecisionRequestId, DecisionScheduler, ScheduledDecision};
use crate::game::state::GameEndReason;
use crate::game::{ActionDispatcher, GameAction, GameState, VerbosityLevel};
use crate::{EngineError, Result};
use smallvec::SmallVec;

/// Virtual milliseconds between two clock ticks
pub const TICK_MS: u64 = 1000;

/// Result of running a game to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameResult {
    /// Winner of the game (None for a draw)
    pub winner: Option<Side>,
    /// Turn number the game ended on
    pub turns_played: u32,
    pub end_reason: GameEndReason,
    /// Virtual match time in milliseconds
    pub elapsed_ms: u64,
}

/// Game loop manager
///
/// Owns the match state and both controllers so it can be moved onto a
/// runtime task as one unit.
pub struct GameLoop {
    pub game: GameState,
    controllers: [Box<dyn PlayerController>; 2],
    clock: TurnClock,
    scheduler: DecisionScheduler,
    /// Outstanding thinking timer per side
    pending: [Option<DecisionRequestId>; 2],
    now_ms: u64,
    next_tick_ms: u64,
    max_turns: u32,
    started: bool,
    end_notified: bool,
    /// Published events not yet taken by the caller
    outbox: Vec<GameEvent>,
}

impl GameLoop {
    /// Create a loop for `game` with one controller per side
    pub fn new(
        game: GameState,
        player: Box<dyn PlayerController>,
        opponent: Box<dyn PlayerController>,
    ) -> Result<Self> {
        if player.side() != Side::Player || opponent.side() != Side::Opponent {
            return Err(EngineError::InvalidConfig(
                "controller sides don't match their seats".to_string(),
            ));
        }
        let defaults = MatchConfig::default();
        Ok(GameLoop {
            game,
            controllers: [player, opponent],
            clock: TurnClock::new(
                defaults.turn_time_budget_secs,
                &defaults.warning_thresholds_secs,
            ),
            scheduler: DecisionScheduler::new(),
            pending: [None, None],
            now_ms: 0,
            next_tick_ms: TICK_MS,
            max_turns: defaults.max_turns,
            started: false,
            end_notified: false,
            outbox: Vec::new(),
        })
    }

    /// Take clock budget, thresholds, and the turn limit from `config`
    pub fn with_config(mut self, config: &MatchConfig) -> Self {
        self.clock = TurnClock::new(config.turn_time_budget_secs, &config.warning_thresholds_secs);
        self.max_turns = config.max_turns;
        self
    }

    /// Set maximum turns before forcing a draw
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_clock(mut self, budget_secs: u32, thresholds: &[u32]) -> Self {
        self.clock = TurnClock::new(budget_secs, thresholds);
        self
    }

    /// Set verbosity on the game's logger, which controllers also see
    pub fn with_verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.game.logger.set_verbosity(verbosity);
        self
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn clock(&self) -> &TurnClock {
        &self.clock
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_finished(&self) -> bool {
        self.game.is_game_over()
    }

    /// The thinking timer currently scheduled for `side`, if any
    pub fn pending_decision(&self, side: Side) -> Option<DecisionRequestId> {
        self.pending[side.index()]
    }

    pub fn is_decision_pending(&self, id: DecisionRequestId) -> bool {
        self.scheduler.is_pending(id)
    }

    /// Drain the events published since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    pub fn result(&self) -> Option<GameResult> {
        self.game.outcome.map(|outcome| GameResult {
            winner: outcome.winner,
            turns_played: outcome.turn_number,
            end_reason: outcome.reason,
            elapsed_ms: self.now_ms,
        })
    }

    /// Announce the match and enter the first untap
    pub fn start(&mut self) -> Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        self.game.logger.set_time(self.now_ms);

        let mut dispatcher = ActionDispatcher::new(&mut self.game);
        dispatcher.start_game()?;
        let events = dispatcher.finish();
        self.publish_all(events)
    }

    /// When the next tick or thinking timer is due
    pub fn next_wakeup_ms(&self) -> Option<u64> {
        if !self.started || self.is_finished() {
            return None;
        }
        let tick = self.next_tick_ms;
        Some(self.scheduler.next_due().map_or(tick, |due| due.min(tick)))
    }

    /// Run the next due item, moving virtual time forward to it
    ///
    /// Returns false once the game is over. Ticks win ties with thinking
    /// timers, so a clock expiry pre-empts a decision due the same instant.
    pub fn step(&mut self) -> Result<bool> {
        if !self.started {
            self.start()?;
            return Ok(!self.is_finished());
        }
        let Some(due) = self.next_wakeup_ms() else {
            return Ok(false);
        };
        self.now_ms = self.now_ms.max(due);
        self.game.logger.set_time(self.now_ms);

        let decision_first = self
            .scheduler
            .next_due()
            .is_some_and(|due| due < self.next_tick_ms);
        if decision_first {
            if let Some(decision) = self.scheduler.take_due(self.now_ms) {
                self.fire_decision(decision)?;
            }
        } else {
            self.tick()?;
        }
        Ok(!self.is_finished())
    }

    /// Process everything due at or before `target_ms`
    pub fn advance_to(&mut self, target_ms: u64) -> Result<()> {
        self.start()?;
        while let Some(due) = self.next_wakeup_ms() {
            if due > target_ms {
                break;
            }
            self.step()?;
        }
        self.now_ms = self.now_ms.max(target_ms);
        Ok(())
    }

    /// Run the game loop until a win condition or the turn limit
    pub fn run_game(&mut self) -> Result<GameResult> {
        self.start()?;
        while self.step()? {}
        self.result().ok_or_else(|| {
            EngineError::IllegalAction("game loop stopped before the game ended".to_string())
        })
    }

    /// Run until `turns` more turns have begun, stopping early if the game ends
    pub fn run_turns(&mut self, turns: u32) -> Result<Option<GameResult>> {
        self.start()?;
        let mut remaining = turns;
        while remaining > 0 && !self.is_finished() {
            let before = (self.game.turn.turn_number, self.game.turn.active_player);
            self.step()?;
            let after = (self.game.turn.turn_number, self.game.turn.active_player);
            if before != after {
                remaining -= 1;
            }
        }
        Ok(self.result())
    }

    /// Submit an action from outside (a manual seat)
    ///
    /// Rejected actions leave the state untouched and are returned as errors;
    /// the caller decides what to tell the user.
    pub fn submit(&mut self, side: Side, action: GameAction) -> Result<()> {
        if !self.started {
            return Err(EngineError::IllegalAction("the match has not started".to_string()));
        }
        let mut dispatcher = ActionDispatcher::new(&mut self.game);
        dispatcher.submit(side, &action)?;
        let events = dispatcher.finish();
        self.publish_all(events)
    }

    /// Replace the decision profile of `side`'s controller
    ///
    /// Returns false when that controller has no profile to replace.
    pub fn set_difficulty(&mut self, side: Side, difficulty: Difficulty, seed: u64) -> bool {
        let changed = self.controllers[side.index()].set_difficulty(difficulty, seed);
        if changed {
            self.game
                .logger
                .normal(&format!("{side} difficulty set to {difficulty}"));
        }
        changed
    }

    fn tick(&mut self) -> Result<()> {
        self.next_tick_ms = self.now_ms + TICK_MS;
        let mut events = Vec::new();
        for clock_event in self.clock.tick() {
            match clock_event {
                ClockEvent::Warning { seconds_remaining } => {
                    let event = GameEvent::TimeWarning { seconds_remaining };
                    self.game.logger.event(&event);
                    events.push(event);
                }
                ClockEvent::Expired => {
                    let mut dispatcher = ActionDispatcher::new(&mut self.game);
                    dispatcher.force_end_turn()?;
                    events.extend(dispatcher.finish());
                }
            }
        }
        self.publish_all(events)
    }

    fn fire_decision(&mut self, decision: ScheduledDecision) -> Result<()> {
        let side = decision.side;
        self.pending[side.index()] = None;

        let action = {
            let view = GameStateView::new(&self.game, side);
            if !view.holds_priority() || view.is_game_over() {
                return Ok(());
            }
            self.controllers[side.index()]
                .choose_action(&view)
                .unwrap_or(GameAction::PassPriority)
        };

        // Anything the dispatcher refuses degrades to a pass
        let mut dispatcher = ActionDispatcher::new(&mut self.game);
        let rejected = dispatcher.submit(side, &action).err();
        if rejected.is_some() {
            dispatcher.submit(side, &GameAction::PassPriority)?;
        }
        let events = dispatcher.finish();
        if let Some(err) = rejected {
            self.game
                .logger
                .verbose(&format!("{side} {action} rejected ({err}), passing instead"));
        }
        self.publish_all(events)
    }

    /// Publish a batch of settled events and reschedule decisions
    fn publish_all(&mut self, events: Vec<GameEvent>) -> Result<()> {
        let mut decision_point_moved = false;
        let mut over_turn_limit = false;

        for event in events {
            match &event {
                GameEvent::TurnChanged { turn_number, .. } => {
                    self.clock.reset();
                    self.next_tick_ms = self.now_ms + TICK_MS;
                    over_turn_limit |= *turn_number > self.max_turns;
                    decision_point_moved = true;
                }
                GameEvent::TimeWarning { .. } | GameEvent::Emote { .. } => {}
                _ => decision_point_moved = true,
            }
            self.publish(event);
        }

        if over_turn_limit && !self.game.is_game_over() {
            let mut dispatcher = ActionDispatcher::new(&mut self.game);
            dispatcher.declare_turn_limit();
            for event in dispatcher.finish() {
                self.publish(event);
            }
        }

        if decision_point_moved || self.game.is_game_over() {
            self.cancel_pending();
        }
        if self.game.is_game_over() {
            self.notify_game_end();
        } else {
            self.schedule_decision();
        }
        Ok(())
    }

    fn publish(&mut self, event: GameEvent) {
        let mut emotes: SmallVec<[GameEvent; 2]> = SmallVec::new();
        if !matches!(event, GameEvent::Emote { .. }) {
            for controller in self.controllers.iter_mut() {
                if let Some(text) = controller.observe(&event, self.now_ms) {
                    emotes.push(GameEvent::Emote {
                        side: controller.side(),
                        text,
                    });
                }
            }
        }
        self.outbox.push(event);
        for emote in emotes {
            self.game.logger.event(&emote);
            self.outbox.push(emote);
        }
    }

    fn cancel_pending(&mut self) {
        for slot in self.pending.iter_mut() {
            if let Some(id) = slot.take() {
                self.scheduler.cancel(id);
            }
        }
    }

    /// Start a thinking timer for the priority holder if it is automated
    fn schedule_decision(&mut self) {
        let holder = self.game.priority.holder();
        let index = holder.index();
        if self.pending[index].is_some() || !self.controllers[index].is_automated() {
            return;
        }
        let view = GameStateView::new(&self.game, holder);
        let delay = self.controllers[index].decision_delay_ms(&view);
        let due = self.now_ms + delay;
        let id = self.scheduler.schedule(holder, due);
        self.pending[index] = Some(id);
        log_if_verbose!(self, "{holder} thinking ({id}, due at {due}ms)");
    }

    fn notify_game_end(&mut self) {
        if self.end_notified {
            return;
        }
        self.end_notified = true;
        let winner = self.game.get_winner();
        for controller in self.controllers.iter_mut() {
            let side = controller.side();
            let view = GameStateView::new(&self.game, side);
            controller.on_game_end(&view, winner == Some(side));
        }
    }
}
