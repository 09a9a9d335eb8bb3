//! AI emotes: cosmetic lines that never touch game state

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Minimum gap between two sent emotes
pub const EMOTE_COOLDOWN_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmoteTrigger {
    GameStart,
    GoodPlay,
    BadPlay,
    TakingDamage,
    WinningPosition,
    LosingPosition,
    GameEnd,
}

impl EmoteTrigger {
    pub fn multiplier(&self) -> f64 {
        match self {
            EmoteTrigger::GameStart => 3.0,
            EmoteTrigger::GoodPlay => 2.0,
            EmoteTrigger::BadPlay => 1.5,
            EmoteTrigger::TakingDamage => 1.2,
            EmoteTrigger::WinningPosition => 1.5,
            EmoteTrigger::LosingPosition => 1.0,
            EmoteTrigger::GameEnd => 5.0,
        }
    }

    pub fn lines(&self) -> &'static [&'static str] {
        match self {
            EmoteTrigger::GameStart => &["Hello!", "Good luck!", "Have fun!"],
            EmoteTrigger::GoodPlay => &["Nice play!", "Well done!", "Impressive!"],
            EmoteTrigger::BadPlay => &["Oops!", "My mistake!", "Hmm..."],
            EmoteTrigger::TakingDamage => &["Ouch!", "That hurt!", "Not bad!"],
            EmoteTrigger::WinningPosition => &["Looking good!", "Almost there!"],
            EmoteTrigger::LosingPosition => &["Well played!", "This is tough!"],
            EmoteTrigger::GameEnd => &["Good game!", "Thanks for playing!", "Well played!"],
        }
    }
}

/// Roll-and-cooldown state for one AI seat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmoteBehavior {
    last_emote_ms: Option<u64>,
}

impl EmoteBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_emote_ms(&self) -> Option<u64> {
        self.last_emote_ms
    }

    pub fn on_cooldown(&self, now_ms: u64) -> bool {
        self.last_emote_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < EMOTE_COOLDOWN_MS)
    }

    /// Roll for an emote at `frequency × trigger multiplier`
    ///
    /// Nothing is rolled while on cooldown. The cooldown restarts only when
    /// a line is actually sent.
    pub fn maybe_emote(
        &mut self,
        trigger: EmoteTrigger,
        frequency: f64,
        now_ms: u64,
        rng: &mut impl Rng,
    ) -> Option<&'static str> {
        if self.on_cooldown(now_ms) {
            return None;
        }
        let chance = (frequency * trigger.multiplier()).clamp(0.0, 1.0);
        if !rng.gen_bool(chance) {
            return None;
        }
        let line = trigger.lines().choose(rng).copied()?;
        self.last_emote_ms = Some(now_ms);
        Some(line)
    }
}
