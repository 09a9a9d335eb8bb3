//! Card instances and their combat-relevant attributes

use crate::core::{CardId, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a card does when played from hand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    /// Enters the field as a creature after resolving
    Summon,
    /// Resolves once and goes to the graveyard
    Effect,
}

/// Card name (distinct from other string types)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardName(String);

impl CardName {
    pub fn new(s: impl Into<String>) -> Self {
        CardName(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CardName {
    fn from(s: &str) -> Self {
        CardName(s.to_string())
    }
}

impl From<String> for CardName {
    fn from(s: String) -> Self {
        CardName(s)
    }
}

/// A card instance during a match
///
/// Only the attributes the core reads for decision making are modelled:
/// the numeric cost, power/toughness, and the tapped and summoning-sickness
/// flags. Rules text is out of scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: CardName,
    pub kind: CardKind,

    /// Number of untapped resources needed to play the card
    pub cost: u8,

    pub power: i8,
    pub toughness: i8,

    /// Effect cards that need a target permanent when cast
    pub requires_target: bool,

    pub owner: Side,
    pub tapped: bool,

    /// Entered the field this turn and cannot attack yet
    pub summoning_sick: bool,

    /// Damage marked this turn (cleared during untap and cleanup)
    pub damage: i32,
}

impl Card {
    pub fn new(id: CardId, name: impl Into<CardName>, kind: CardKind, owner: Side) -> Self {
        Card {
            id,
            name: name.into(),
            kind,
            cost: 0,
            power: 0,
            toughness: 0,
            requires_target: false,
            owner,
            tapped: false,
            summoning_sick: false,
            damage: 0,
        }
    }

    pub fn is_summon(&self) -> bool {
        self.kind == CardKind::Summon
    }

    pub fn is_effect(&self) -> bool {
        self.kind == CardKind::Effect
    }

    pub fn tap(&mut self) {
        self.tapped = true;
    }

    pub fn untap(&mut self) {
        self.tapped = false;
    }

    /// Untapped and free of summoning sickness
    pub fn can_attack(&self) -> bool {
        self.is_summon() && !self.tapped && !self.summoning_sick
    }

    pub fn can_block(&self) -> bool {
        self.is_summon() && !self.tapped
    }

    /// Toughness left after damage marked this turn
    pub fn remaining_toughness(&self) -> i32 {
        i32::from(self.toughness).saturating_sub(self.damage)
    }

    pub fn has_lethal_damage(&self) -> bool {
        self.is_summon() && self.damage >= i32::from(self.toughness)
    }
}
