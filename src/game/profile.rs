//! Decision parameter profiles for the AI opponent
//!
//! A profile is a pure function of `(difficulty, seed)`: the six personality
//! traits are sampled from per-tier ranges and the timing and error-rate
//! scalars come from a fixed per-tier table. Changing difficulty builds a
//! new profile; profiles are never patched in place.

use crate::EngineError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// AI skill tiers, lowest to highest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Easy,
    Normal,
    Hard,
    Expert,
    Mythic,
}

impl Difficulty {
    pub const ALL: [Difficulty; 6] = [
        Difficulty::Beginner,
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Expert,
        Difficulty::Mythic,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Expert => "expert",
            Difficulty::Mythic => "mythic",
        }
    }

    pub fn parameters(&self) -> &'static TierParameters {
        &TIER_TABLE[*self as usize]
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::InvalidConfig(format!("unknown difficulty '{s}'")))
    }
}

/// How much thought a decision point deserves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Simple,
    Normal,
    Complex,
    Critical,
}

impl DecisionKind {
    pub fn multiplier(&self) -> f64 {
        match self {
            DecisionKind::Simple => 0.7,
            DecisionKind::Normal => 1.0,
            DecisionKind::Complex => 1.5,
            DecisionKind::Critical => 2.0,
        }
    }
}

/// Fixed per-tier ranges and scalars
#[derive(Debug, Clone, PartialEq)]
pub struct TierParameters {
    pub aggressiveness: RangeInclusive<u8>,
    pub risk_tolerance: RangeInclusive<u8>,
    pub creativity: RangeInclusive<u8>,
    pub patience: RangeInclusive<u8>,
    pub adaptability: RangeInclusive<u8>,
    pub decision_delay_base_ms: u64,
    pub variability_factor: f64,
    pub mistake_chance: f64,
    pub emote_frequency: f64,
}

const TIER_TABLE: [TierParameters; 6] = [
    TierParameters {
        aggressiveness: 10..=30,
        risk_tolerance: 10..=30,
        creativity: 5..=20,
        patience: 20..=40,
        adaptability: 10..=30,
        decision_delay_base_ms: 2500,
        variability_factor: 0.8,
        mistake_chance: 0.25,
        emote_frequency: 0.4,
    },
    TierParameters {
        aggressiveness: 20..=40,
        risk_tolerance: 20..=40,
        creativity: 15..=35,
        patience: 30..=50,
        adaptability: 20..=40,
        decision_delay_base_ms: 2000,
        variability_factor: 0.6,
        mistake_chance: 0.15,
        emote_frequency: 0.3,
    },
    TierParameters {
        aggressiveness: 40..=60,
        risk_tolerance: 40..=60,
        creativity: 40..=60,
        patience: 40..=60,
        adaptability: 40..=60,
        decision_delay_base_ms: 1500,
        variability_factor: 0.4,
        mistake_chance: 0.08,
        emote_frequency: 0.2,
    },
    TierParameters {
        aggressiveness: 50..=70,
        risk_tolerance: 50..=70,
        creativity: 60..=80,
        patience: 60..=80,
        adaptability: 60..=80,
        decision_delay_base_ms: 1200,
        variability_factor: 0.3,
        mistake_chance: 0.04,
        emote_frequency: 0.15,
    },
    TierParameters {
        aggressiveness: 60..=80,
        risk_tolerance: 60..=80,
        creativity: 70..=90,
        patience: 70..=90,
        adaptability: 70..=90,
        decision_delay_base_ms: 1000,
        variability_factor: 0.2,
        mistake_chance: 0.02,
        emote_frequency: 0.1,
    },
    TierParameters {
        aggressiveness: 70..=95,
        risk_tolerance: 70..=95,
        creativity: 80..=100,
        patience: 80..=100,
        adaptability: 80..=100,
        decision_delay_base_ms: 800,
        variability_factor: 0.1,
        mistake_chance: 0.01,
        emote_frequency: 0.05,
    },
];

/// Personality traits, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    pub aggressiveness: u8,
    pub risk_tolerance: u8,
    pub creativity: u8,
    pub patience: u8,
    pub adaptability: u8,
    /// Uniform over [0, 100] at every tier
    pub emotionality: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionParameterProfile {
    pub difficulty: Difficulty,
    pub seed: u64,
    pub personality: Personality,
    pub decision_delay_base_ms: u64,
    pub variability_factor: f64,
    pub mistake_chance: f64,
    /// Tier base frequency before the emotionality rescale
    pub base_emote_frequency: f64,
    pub emote_frequency: f64,
    /// User-facing pacing knob applied on top of every delay
    pub thinking_time_multiplier: f64,
}

impl DecisionParameterProfile {
    pub fn generate(difficulty: Difficulty, seed: u64) -> Self {
        let params = difficulty.parameters();
        let mut rng = ChaCha12Rng::seed_from_u64(seed);

        let personality = Personality {
            aggressiveness: rng.gen_range(params.aggressiveness.clone()),
            risk_tolerance: rng.gen_range(params.risk_tolerance.clone()),
            creativity: rng.gen_range(params.creativity.clone()),
            patience: rng.gen_range(params.patience.clone()),
            adaptability: rng.gen_range(params.adaptability.clone()),
            emotionality: rng.gen_range(0..=100),
        };

        let emote_scale = 0.5 + f64::from(personality.emotionality) / 100.0;

        DecisionParameterProfile {
            difficulty,
            seed,
            personality,
            decision_delay_base_ms: params.decision_delay_base_ms,
            variability_factor: params.variability_factor,
            mistake_chance: params.mistake_chance,
            base_emote_frequency: params.emote_frequency,
            emote_frequency: params.emote_frequency * emote_scale,
            thinking_time_multiplier: 1.0,
        }
    }

    pub fn with_thinking_time_multiplier(mut self, multiplier: f64) -> Self {
        self.thinking_time_multiplier = multiplier;
        self
    }

    /// Thinking delay for one decision, jittered by [0.8, 1.2]
    pub fn decision_delay_ms(&self, kind: DecisionKind, rng: &mut impl Rng) -> u64 {
        let jitter = rng.gen_range(0.8..=1.2);
        self.delay_with_jitter(kind, jitter)
    }

    /// Smallest and largest delay `decision_delay_ms` can return for `kind`
    pub fn delay_bounds(&self, kind: DecisionKind) -> (u64, u64) {
        (self.delay_with_jitter(kind, 0.8), self.delay_with_jitter(kind, 1.2))
    }

    fn delay_with_jitter(&self, kind: DecisionKind, jitter: f64) -> u64 {
        let ms = self.decision_delay_base_ms as f64
            * kind.multiplier()
            * jitter
            * self.thinking_time_multiplier;
        ms.max(0.0).floor() as u64
    }
}
