//! Match logger
//!
//! Messages are formatted once and either printed, captured to an
//! in-memory buffer, or both. JSON mode writes one object per line.

use crate::game::events::GameEvent;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::ops::Deref;

/// Verbosity level for match output
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VerbosityLevel {
    /// No output during the match
    Silent = 0,
    /// Only the outcome
    Minimal = 1,
    /// Turns, phases, and key actions (default)
    #[default]
    Normal = 2,
    /// Every event, including clock ticks and AI reasoning
    Verbose = 3,
}

/// Output format for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Machine-readable JSON output (one object per line)
    Json,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    #[default]
    Stdout,
    /// Capture only to the in-memory buffer
    Memory,
    Both,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// e.g. "controller_choice", "phase", "clock"
    pub category: Option<String>,
    /// Virtual match time when the entry was written
    pub at_ms: Option<u64>,
}

/// Read-only view of captured entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> LogGuard<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_format: OutputFormat,
    output_mode: OutputMode,
    /// Virtual time stamped onto subsequent entries
    now_ms: Option<u64>,
    log_buffer: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_format: OutputFormat::default(),
            output_mode: OutputMode::default(),
            now_ms: None,
            log_buffer: RefCell::new(Vec::new()),
        }
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Capture to memory and suppress stdout
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn disable_capture(&mut self) {
        self.output_mode = OutputMode::Stdout;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    pub fn set_time(&mut self, now_ms: u64) {
        self.now_ms = Some(now_ms);
    }

    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    pub fn clear_logs(&mut self) {
        self.log_buffer.borrow_mut().clear();
    }

    /// Print buffered entries the current verbosity allows, then clear
    pub fn flush_buffer(&mut self) {
        let buffer = self.log_buffer.borrow();
        for entry in buffer.iter().filter(|e| e.level <= self.verbosity) {
            self.write_stdout(entry);
        }
        drop(buffer);
        self.clear_logs();
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        self.log(VerbosityLevel::Minimal, None, message);
    }

    #[inline]
    pub fn normal(&self, message: &str) {
        self.log(VerbosityLevel::Normal, None, message);
    }

    #[inline]
    pub fn verbose(&self, message: &str) {
        self.log(VerbosityLevel::Verbose, None, message);
    }

    /// Log a controller decision at Normal level
    ///
    /// The controller name is not part of the message so that logs of the
    /// same match agree regardless of who made the choice.
    #[inline]
    pub fn controller_choice(&self, controller_name: &str, message: &str) {
        let _ = controller_name;
        self.log(VerbosityLevel::Normal, Some("controller_choice"), message);
    }

    /// Log a published event under its category
    pub fn event(&self, event: &GameEvent) {
        let level = match event {
            GameEvent::GameOver(_) => VerbosityLevel::Minimal,
            GameEvent::TimeWarning { .. }
            | GameEvent::ActionRequired(_)
            | GameEvent::PriorityChanged { .. } => VerbosityLevel::Verbose,
            _ => VerbosityLevel::Normal,
        };
        if !self.wants(level) {
            return;
        }
        let message = match self.output_format {
            OutputFormat::Json => serde_json::to_string(event).unwrap_or_default(),
            OutputFormat::Text => describe(event),
        };
        self.log(level, Some(event.category()), &message);
    }

    fn wants(&self, level: VerbosityLevel) -> bool {
        level <= self.verbosity || self.is_capturing()
    }

    fn log(&self, level: VerbosityLevel, category: Option<&str>, message: &str) {
        let should_capture = self.is_capturing();
        let should_output = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both)
            && level <= self.verbosity;

        if !should_capture && !should_output {
            return;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            category: category.map(str::to_string),
            at_ms: self.now_ms,
        };
        if should_output {
            self.write_stdout(&entry);
        }
        if should_capture {
            self.log_buffer.borrow_mut().push(entry);
        }
    }

    fn write_stdout(&self, entry: &LogEntry) {
        match self.output_format {
            OutputFormat::Json => {
                if let Ok(line) = serde_json::to_string(entry) {
                    println!("{line}");
                }
            }
            OutputFormat::Text if entry.level == VerbosityLevel::Minimal => {
                println!("{}", entry.message)
            }
            OutputFormat::Text => println!("  {}", entry.message),
        }
    }
}

/// One-line human description of an event
fn describe(event: &GameEvent) -> String {
    match event {
        GameEvent::GameStarted { first_player } => {
            format!("Match started, {first_player} goes first")
        }
        GameEvent::PhaseChanged { from, to } => {
            format!("{} -> {}", from.display_name(), to.display_name())
        }
        GameEvent::PriorityChanged { holder } => format!("Priority: {holder}"),
        GameEvent::TurnChanged {
            active_player,
            turn_number,
        } => format!("=== Turn {turn_number} ({active_player}) ==="),
        GameEvent::TimeWarning { seconds_remaining } => {
            format!("{seconds_remaining} seconds remaining")
        }
        GameEvent::ActionRequired(prompt) => format!("[{}]", prompt.label),
        GameEvent::ActionTaken { side, action } => format!("{side} {action}"),
        GameEvent::StackResolved { entry } => {
            format!("Resolved {} ({})", entry.source, entry.controller)
        }
        GameEvent::StackDiscarded { entry } => format!("Discarded {} from the stack", entry.source),
        GameEvent::CardDrawn { side } => format!("{side} draws a card"),
        GameEvent::LifeChanged { side, life, delta } => format!("{side} life {delta:+} -> {life}"),
        GameEvent::CreatureDestroyed { card, owner } => format!("{owner}'s {card} destroyed"),
        GameEvent::TurnTimedOut { side } => format!("{side} ran out of time"),
        GameEvent::Emote { side, text } => format!("{side}: \"{text}\""),
        GameEvent::GameOver(outcome) => match outcome.winner {
            Some(winner) => format!("Game over: {winner} wins ({:?})", outcome.reason),
            None => format!("Game over: draw ({:?})", outcome.reason),
        },
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}

/// Clones carry settings only, never the captured buffer
impl Clone for GameLogger {
    fn clone(&self) -> Self {
        GameLogger {
            verbosity: self.verbosity,
            output_format: self.output_format,
            output_mode: self.output_mode,
            now_ms: self.now_ms,
            log_buffer: RefCell::new(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Side;
    use crate::game::Phase;

    #[test]
    fn test_logger_creation() {
        let logger = GameLogger::new();
        assert_eq!(logger.verbosity(), VerbosityLevel::Normal);
    }

    #[test]
    fn test_log_capture() {
        let mut logger = GameLogger::new();
        logger.enable_capture();

        logger.normal("test message");
        logger.minimal("minimal message");

        let logs = logger.logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].message, "test message");
        assert_eq!(logs[1].message, "minimal message");
    }

    #[test]
    fn test_event_category_and_time() {
        let mut logger = GameLogger::new();
        logger.enable_capture();
        logger.set_time(1500);
        logger.event(&GameEvent::PhaseChanged {
            from: Phase::Untap,
            to: Phase::Upkeep,
        });

        let logs = logger.logs();
        assert_eq!(logs[0].category.as_deref(), Some("phase"));
        assert_eq!(logs[0].at_ms, Some(1500));
        assert_eq!(logs[0].message, "Untap -> Upkeep");
    }

    #[test]
    fn test_json_event_lines() {
        let mut logger = GameLogger::new();
        logger.enable_capture();
        logger.set_output_format(OutputFormat::Json);
        logger.event(&GameEvent::TurnTimedOut { side: Side::Opponent });

        let parsed: serde_json::Value = serde_json::from_str(&logger.logs()[0].message).unwrap();
        assert_eq!(parsed["event"], "turn_timed_out");
        assert_eq!(parsed["side"], "opponent");
    }

    #[test]
    fn test_flush_buffer_clears() {
        let mut logger = GameLogger::with_verbosity(VerbosityLevel::Silent);
        logger.enable_capture();
        logger.verbose("hidden");
        assert_eq!(logger.logs().len(), 1);

        logger.flush_buffer();
        assert!(logger.logs().is_empty());
    }

    #[test]
    fn test_clone_drops_buffer() {
        let mut logger = GameLogger::new();
        logger.enable_capture();
        logger.normal("kept");
        let copy = logger.clone();
        assert!(copy.is_capturing());
        assert!(copy.logs().is_empty());
    }
}
