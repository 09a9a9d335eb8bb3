//! Main game state structure

use crate::core::{Card, CardId, EntityStore, PlayerState, Side};
use crate::game::game_init::CardTemplate;
use crate::game::{CombatState, GameLogger, PriorityState, TurnStructure};
use crate::zones::{PlayerZones, Zone};
use crate::{EngineError, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

/// Reason the game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameEndReason {
    /// The loser's life reached 0 or less
    LifeDepleted,
    /// The loser had to draw from an empty library
    Decking,
    /// The configured turn limit was exceeded (draw)
    TurnLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    /// None for a draw
    pub winner: Option<Side>,
    pub reason: GameEndReason,
    pub turn_number: u32,
}

/// Complete match state
///
/// Every field is mutated only by the `ActionDispatcher`; controllers and the
/// game loop read it through `GameStateView`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub cards: EntityStore<Card>,

    /// Indexed by `Side::index`
    pub players: [PlayerState; 2],
    pub zones: [PlayerZones; 2],

    pub turn: TurnStructure,
    pub priority: PriorityState,
    pub combat: CombatState,

    pub outcome: Option<GameOutcome>,

    /// The first player skips the draw on turn one
    pub skip_first_draw: bool,

    /// Library shuffle RNG, serialized for replay
    ///
    /// AI seats carry their own seeded RNGs and never draw from this one.
    pub rng: ChaCha12Rng,

    #[serde(skip)]
    pub logger: GameLogger,
}

impl GameState {
    /// Create a new match with two players
    pub fn new_two_player(
        player_name: impl Into<String>,
        opponent_name: impl Into<String>,
        starting_life: i32,
        first_player: Side,
    ) -> Self {
        GameState {
            cards: EntityStore::new(),
            players: [
                PlayerState::new(Side::Player, player_name.into(), starting_life),
                PlayerState::new(Side::Opponent, opponent_name.into(), starting_life),
            ],
            zones: [PlayerZones::new(Side::Player), PlayerZones::new(Side::Opponent)],
            turn: TurnStructure::new(first_player),
            priority: PriorityState::new(first_player),
            combat: CombatState::new(),
            outcome: None,
            skip_first_draw: true,
            rng: ChaCha12Rng::seed_from_u64(0),
            logger: GameLogger::new(),
        }
    }

    pub fn seed_rng(&mut self, seed: u64) {
        self.rng = ChaCha12Rng::seed_from_u64(seed);
    }

    pub fn shuffle_library(&mut self, side: Side) {
        let zones = &mut self.zones[side.index()];
        zones.library.shuffle(&mut self.rng);
    }

    pub fn player(&self, side: Side) -> &PlayerState {
        &self.players[side.index()]
    }

    pub fn player_mut(&mut self, side: Side) -> &mut PlayerState {
        &mut self.players[side.index()]
    }

    pub fn zones(&self, side: Side) -> &PlayerZones {
        &self.zones[side.index()]
    }

    pub fn zones_mut(&mut self, side: Side) -> &mut PlayerZones {
        &mut self.zones[side.index()]
    }

    pub fn card(&self, id: CardId) -> Result<&Card> {
        self.cards.get(id)
    }

    pub fn card_mut(&mut self, id: CardId) -> Result<&mut Card> {
        self.cards.get_mut(id)
    }

    /// Instantiate a template for `owner` directly into `zone`
    pub fn add_card(&mut self, owner: Side, zone: Zone, template: &CardTemplate) -> Result<CardId> {
        let id = self.cards.next_id();
        let mut card = template.instantiate(id, owner);
        if zone == Zone::Field {
            card.summoning_sick = false;
        }
        self.cards.insert(id, card);
        self.zones_mut(owner)
            .get_zone_mut(zone)
            .ok_or_else(|| EngineError::IllegalAction(format!("cannot place cards in the {zone}")))?
            .add(id);
        Ok(id)
    }

    /// Move a card between two of its owner's zones
    pub fn move_card(&mut self, card_id: CardId, from: Zone, to: Zone) -> Result<()> {
        let owner = self.card(card_id)?.owner;
        let zones = self.zones_mut(owner);

        let removed = match zones.get_zone_mut(from) {
            Some(zone) => zone.remove(card_id),
            None => from == Zone::Stack,
        };
        if !removed {
            return Err(EngineError::IllegalAction(format!(
                "Card {card_id} not found in {from}"
            )));
        }
        if let Some(zone) = zones.get_zone_mut(to) {
            zone.add(card_id);
        }
        Ok(())
    }

    /// Draw the top card of a library
    ///
    /// Returns `Ok(None)` when the library is empty.
    pub fn draw_card(&mut self, side: Side) -> Result<Option<CardId>> {
        let zones = self.zones_mut(side);
        match zones.library.draw_top() {
            Some(card_id) => {
                zones.hand.add(card_id);
                Ok(Some(card_id))
            }
            None => Ok(None),
        }
    }

    /// Untap every permanent and resource, clear sickness and damage
    pub fn untap_all(&mut self, side: Side) -> Result<()> {
        let zones = self.zones(side);
        let ids: Vec<CardId> = zones
            .field
            .cards
            .iter()
            .chain(zones.resource_row.cards.iter())
            .copied()
            .collect();
        for id in ids {
            let card = self.card_mut(id)?;
            card.untap();
            card.summoning_sick = false;
            card.damage = 0;
        }
        Ok(())
    }

    /// Untapped resource-row cards in row order
    pub fn untapped_resources(&self, side: Side) -> Vec<CardId> {
        self.zones(side)
            .resource_row
            .cards
            .iter()
            .copied()
            .filter(|id| self.card(*id).is_ok_and(|c| !c.tapped))
            .collect()
    }

    pub fn creatures(&self, side: Side) -> impl Iterator<Item = &Card> + '_ {
        self.zones(side)
            .field
            .cards
            .iter()
            .filter_map(|id| self.cards.get(*id).ok())
    }

    pub fn is_game_over(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn get_winner(&self) -> Option<Side> {
        self.outcome.and_then(|o| o.winner)
    }
}
