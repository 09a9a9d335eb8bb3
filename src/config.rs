//! Match configuration
//!
//! Every field has a default, so a JSON file only needs the keys it
//! overrides.

use crate::core::Side;
use crate::game::clock::{DEFAULT_TURN_BUDGET_SECS, DEFAULT_WARNING_THRESHOLDS_SECS};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub turn_time_budget_secs: u32,
    pub warning_thresholds_secs: Vec<u32>,
    pub starting_life: i32,
    pub opening_hand_size: usize,
    pub first_player: Side,
    pub skip_first_draw: bool,
    /// Exceeding this turn number ends the match as a draw
    pub max_turns: u32,
    pub seed: u64,
    /// Scales every AI thinking delay
    pub thinking_time_multiplier: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            turn_time_budget_secs: DEFAULT_TURN_BUDGET_SECS,
            warning_thresholds_secs: DEFAULT_WARNING_THRESHOLDS_SECS.to_vec(),
            starting_life: 20,
            opening_hand_size: 5,
            first_player: Side::Player,
            skip_first_draw: true,
            max_turns: 100,
            seed: 0,
            thinking_time_multiplier: 1.0,
        }
    }
}

impl MatchConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: MatchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.turn_time_budget_secs == 0 {
            return Err(EngineError::InvalidConfig(
                "turn_time_budget_secs must be positive".to_string(),
            ));
        }
        if !self.thinking_time_multiplier.is_finite() || self.thinking_time_multiplier <= 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "thinking_time_multiplier must be a positive number, got {}",
                self.thinking_time_multiplier
            )));
        }
        if self.max_turns == 0 {
            return Err(EngineError::InvalidConfig("max_turns must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_turn_budget(mut self, secs: u32) -> Self {
        self.turn_time_budget_secs = secs;
        self
    }

    pub fn with_first_player(mut self, side: Side) -> Self {
        self.first_player = side;
        self
    }

    pub fn with_thinking_time_multiplier(mut self, multiplier: f64) -> Self {
        self.thinking_time_multiplier = multiplier;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"turn_time_budget_secs": 90, "first_player": "opponent"}"#;
        let config = MatchConfig::from_json_str(json).unwrap();
        assert_eq!(config.turn_time_budget_secs, 90);
        assert_eq!(config.first_player, Side::Opponent);
        assert_eq!(config.warning_thresholds_secs, vec![60, 30, 10]);
        assert_eq!(config.starting_life, 20);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(MatchConfig::default().with_turn_budget(0).validate().is_err());
        assert!(MatchConfig::default().with_max_turns(0).validate().is_err());
        assert!(MatchConfig::default()
            .with_thinking_time_multiplier(f64::NAN)
            .validate()
            .is_err());
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_side_is_error() {
        let err = MatchConfig::from_json_str(r#"{"first_player": "spectator"}"#).unwrap_err();
        assert!(matches!(err, EngineError::SerializationError(_)));
    }
}
