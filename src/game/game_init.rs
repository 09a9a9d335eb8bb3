//! Match setup: card templates, deck lists, and the game initializer
//!
//! Deck lists are plain JSON so collaborators can hand the engine whatever
//! their deck manager produces:
//!
//! ```json
//! { "name": "Starter", "cards": [
//!     { "count": 4, "name": "Ember Whelp", "kind": "summon",
//!       "cost": 1, "power": 1, "toughness": 1 },
//!     { "count": 2, "name": "Azoth Bolt", "kind": "effect", "cost": 2, "requires_target": true }
//! ] }
//! ```

use crate::config::MatchConfig;
use crate::core::{Card, CardId, CardKind, CardName, Side};
use crate::game::GameState;
use crate::zones::Zone;
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// The data needed to create card instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardTemplate {
    pub name: String,
    pub kind: CardKind,
    pub cost: u8,
    #[serde(default)]
    pub power: i8,
    #[serde(default)]
    pub toughness: i8,
    #[serde(default)]
    pub requires_target: bool,
}

impl CardTemplate {
    pub fn summon(name: impl Into<String>, cost: u8, power: i8, toughness: i8) -> Self {
        CardTemplate {
            name: name.into(),
            kind: CardKind::Summon,
            cost,
            power,
            toughness,
            requires_target: false,
        }
    }

    pub fn effect(name: impl Into<String>, cost: u8) -> Self {
        CardTemplate {
            name: name.into(),
            kind: CardKind::Effect,
            cost,
            power: 0,
            toughness: 0,
            requires_target: false,
        }
    }

    pub fn targeted(mut self) -> Self {
        self.requires_target = true;
        self
    }

    /// Create a card instance owned by `owner`
    pub fn instantiate(&self, id: CardId, owner: Side) -> Card {
        let mut card = Card::new(id, CardName::new(self.name.clone()), self.kind, owner);
        card.cost = self.cost;
        card.power = self.power;
        card.toughness = self.toughness;
        card.requires_target = self.requires_target;
        card
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub count: u32,
    #[serde(flatten)]
    pub card: CardTemplate,
}

/// A named list of card templates with copy counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckList {
    pub name: String,
    pub cards: Vec<DeckEntry>,
}

impl DeckList {
    pub fn new(name: impl Into<String>) -> Self {
        DeckList {
            name: name.into(),
            cards: Vec::new(),
        }
    }

    pub fn with(mut self, count: u32, card: CardTemplate) -> Self {
        self.cards.push(DeckEntry { count, card });
        self
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let deck: DeckList = serde_json::from_str(json)?;
        if deck.total_cards() == 0 {
            return Err(EngineError::InvalidConfig(format!("deck '{}' has no cards", deck.name)));
        }
        Ok(deck)
    }

    pub fn total_cards(&self) -> usize {
        self.cards.iter().map(|e| e.count as usize).sum()
    }

    /// Forty cards of vanilla creatures and a few effects
    pub fn starter() -> Self {
        DeckList::new("Starter")
            .with(4, CardTemplate::summon("Ember Whelp", 1, 1, 1))
            .with(4, CardTemplate::summon("Tide Sprite", 1, 1, 2))
            .with(4, CardTemplate::summon("Grove Sentinel", 2, 2, 2))
            .with(4, CardTemplate::summon("Ash Raider", 2, 3, 1))
            .with(4, CardTemplate::summon("Stone Warden", 3, 2, 4))
            .with(4, CardTemplate::summon("Flame Drake", 3, 3, 3))
            .with(3, CardTemplate::summon("Storm Giant", 4, 4, 4))
            .with(3, CardTemplate::summon("Deepwood Titan", 5, 5, 6))
            .with(2, CardTemplate::summon("Azoth Colossus", 6, 7, 7))
            .with(4, CardTemplate::effect("Azoth Bolt", 2).targeted())
            .with(2, CardTemplate::effect("Insight", 1))
            .with(2, CardTemplate::effect("Elemental Surge", 4))
    }
}

/// Builds a ready-to-start `GameState` from two deck lists
pub struct GameInitializer<'a> {
    config: &'a MatchConfig,
}

impl<'a> GameInitializer<'a> {
    pub fn new(config: &'a MatchConfig) -> Self {
        GameInitializer { config }
    }

    /// Create the match, shuffle both libraries, and deal opening hands
    pub fn init_game(
        &self,
        player_name: impl Into<String>,
        player_deck: &DeckList,
        opponent_name: impl Into<String>,
        opponent_deck: &DeckList,
    ) -> Result<GameState> {
        let config = self.config;
        config.validate()?;

        let mut game = GameState::new_two_player(
            player_name,
            opponent_name,
            config.starting_life,
            config.first_player,
        );
        game.skip_first_draw = config.skip_first_draw;
        game.seed_rng(config.seed);

        for (side, deck) in [(Side::Player, player_deck), (Side::Opponent, opponent_deck)] {
            self.load_deck_into_game(&mut game, side, deck)?;
            game.shuffle_library(side);
            for _ in 0..config.opening_hand_size {
                if game.draw_card(side)?.is_none() {
                    break;
                }
            }
        }
        Ok(game)
    }

    fn load_deck_into_game(&self, game: &mut GameState, side: Side, deck: &DeckList) -> Result<()> {
        for entry in &deck.cards {
            for _ in 0..entry.count {
                game.add_card(side, Zone::Library, &entry.card)?;
            }
        }
        Ok(())
    }
}
