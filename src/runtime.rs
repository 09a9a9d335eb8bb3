//! Real-time match runner
//!
//! A tokio task owns one `GameLoop` and is the only place its state is
//! mutated. Virtual match time is pinned to the task's monotonic clock:
//! thinking timers and clock ticks become `sleep_until` deadlines, and
//! external commands are applied after catching up to the current instant,
//! so every change is serialized through the actor.

use crate::core::Side;
use crate::game::events::GameEvent;
use crate::game::phase::Phase;
use crate::game::profile::Difficulty;
use crate::game::{GameAction, GameLoop, GameResult};
use crate::{EngineError, Result};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

/// Requests accepted by the match task
#[derive(Debug)]
pub enum MatchCommand {
    Submit {
        side: Side,
        action: GameAction,
        reply: oneshot::Sender<Result<()>>,
    },
    SetDifficulty {
        side: Side,
        difficulty: Difficulty,
        seed: u64,
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        reply: oneshot::Sender<MatchSnapshot>,
    },
    Shutdown,
}

/// Point-in-time summary of a running match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchSnapshot {
    pub now_ms: u64,
    pub turn_number: u32,
    pub phase: Phase,
    pub active_player: Side,
    pub priority: Side,
    pub passed_in_succession: u8,
    pub stack_len: usize,
    pub clock_remaining_secs: u32,
    /// Indexed by `Side::index`
    pub life: [i32; 2],
    pub finished: bool,
}

impl MatchSnapshot {
    fn capture(game_loop: &GameLoop) -> Self {
        let game = &game_loop.game;
        MatchSnapshot {
            now_ms: game_loop.now_ms(),
            turn_number: game.turn.turn_number,
            phase: game.turn.phase,
            active_player: game.turn.active_player,
            priority: game.priority.holder(),
            passed_in_succession: game.priority.passed_in_succession(),
            stack_len: game.priority.stack().len(),
            clock_remaining_secs: game_loop.clock().remaining_secs(),
            life: [game.player(Side::Player).life, game.player(Side::Opponent).life],
            finished: game_loop.is_finished(),
        }
    }
}

/// Handle to a spawned match task
pub struct MatchHandle {
    commands: mpsc::UnboundedSender<MatchCommand>,
    task: JoinHandle<Result<Option<GameResult>>>,
}

impl MatchHandle {
    /// Spawn the match task; published events arrive on the returned receiver
    ///
    /// The task ends when the game is over, on `shutdown`, or when every
    /// handle is dropped.
    pub fn spawn(game_loop: GameLoop) -> (Self, mpsc::UnboundedReceiver<GameEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_match(game_loop, command_rx, event_tx));
        (
            MatchHandle {
                commands: command_tx,
                task,
            },
            event_rx,
        )
    }

    pub async fn submit(&self, side: Side, action: GameAction) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        self.send(MatchCommand::Submit { side, action, reply })?;
        rx.await.map_err(|_| EngineError::ChannelClosed)?
    }

    pub async fn set_difficulty(
        &self,
        side: Side,
        difficulty: Difficulty,
        seed: u64,
    ) -> Result<bool> {
        let (reply, rx) = oneshot::channel();
        self.send(MatchCommand::SetDifficulty {
            side,
            difficulty,
            seed,
            reply,
        })?;
        rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    pub async fn snapshot(&self) -> Result<MatchSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(MatchCommand::Snapshot { reply })?;
        rx.await.map_err(|_| EngineError::ChannelClosed)
    }

    /// Stop the task and return the result if the game had ended
    pub async fn shutdown(self) -> Result<Option<GameResult>> {
        // The task may already be gone if the game ended
        let _ = self.commands.send(MatchCommand::Shutdown);
        self.task.await?
    }

    /// Wait for the game to end on its own
    pub async fn join(self) -> Result<Option<GameResult>> {
        let MatchHandle { commands, task } = self;
        let result = task.await?;
        drop(commands);
        result
    }

    fn send(&self, command: MatchCommand) -> Result<()> {
        self.commands.send(command).map_err(|_| EngineError::ChannelClosed)
    }
}

async fn run_match(
    mut game_loop: GameLoop,
    mut commands: mpsc::UnboundedReceiver<MatchCommand>,
    events: mpsc::UnboundedSender<GameEvent>,
) -> Result<Option<GameResult>> {
    let origin = Instant::now();
    game_loop.start()?;
    forward_events(&mut game_loop, &events);

    while !game_loop.is_finished() {
        let wakeup = game_loop
            .next_wakeup_ms()
            .map(|ms| origin + Duration::from_millis(ms));

        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                game_loop.advance_to(elapsed_ms(origin))?;
                if !handle_command(&mut game_loop, command) {
                    break;
                }
            }
            _ = sleep_until_or_forever(wakeup) => {
                game_loop.advance_to(elapsed_ms(origin))?;
            }
        }
        forward_events(&mut game_loop, &events);
    }

    Ok(game_loop.result())
}

/// Returns false on shutdown
fn handle_command(game_loop: &mut GameLoop, command: MatchCommand) -> bool {
    match command {
        MatchCommand::Submit { side, action, reply } => {
            let _ = reply.send(game_loop.submit(side, action));
        }
        MatchCommand::SetDifficulty {
            side,
            difficulty,
            seed,
            reply,
        } => {
            let _ = reply.send(game_loop.set_difficulty(side, difficulty, seed));
        }
        MatchCommand::Snapshot { reply } => {
            let _ = reply.send(MatchSnapshot::capture(game_loop));
        }
        MatchCommand::Shutdown => return false,
    }
    true
}

fn forward_events(game_loop: &mut GameLoop, events: &mpsc::UnboundedSender<GameEvent>) {
    for event in game_loop.take_events() {
        // Nobody listening is fine; the match keeps running
        let _ = events.send(event);
    }
}

async fn sleep_until_or_forever(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn elapsed_ms(origin: Instant) -> u64 {
    u64::try_from(origin.elapsed().as_millis()).unwrap_or(u64::MAX)
}
