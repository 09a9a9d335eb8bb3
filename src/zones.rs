//! Per-player zones (library, hand, field, resource row, graveyard)

use crate::core::{CardId, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Places a card can be during a match
///
/// Cards on the stack are held by the stack entries themselves, so the
/// stack has no `CardZone` of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Library,
    Hand,
    Field,
    ResourceRow,
    Graveyard,
    Stack,
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Zone::Library => "library",
            Zone::Hand => "hand",
            Zone::Field => "field",
            Zone::ResourceRow => "resource row",
            Zone::Graveyard => "graveyard",
            Zone::Stack => "stack",
        };
        f.write_str(name)
    }
}

/// An ordered list of cards owned by one side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardZone {
    pub zone_type: Zone,
    pub owner: Side,
    pub cards: Vec<CardId>,
}

impl CardZone {
    pub fn new(zone_type: Zone, owner: Side) -> Self {
        CardZone {
            zone_type,
            owner,
            cards: Vec::new(),
        }
    }

    pub fn add(&mut self, card_id: CardId) {
        self.cards.push(card_id);
    }

    pub fn remove(&mut self, card_id: CardId) -> bool {
        // remove() rather than swap_remove(): controllers iterate zones in
        // order and the AI's first-N payment rule depends on it
        if let Some(pos) = self.cards.iter().position(|&id| id == card_id) {
            self.cards.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.cards.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Draw from top (for Library)
    pub fn draw_top(&mut self) -> Option<CardId> {
        self.cards.pop()
    }

    pub fn shuffle(&mut self, rng: &mut impl rand::Rng) {
        use rand::seq::SliceRandom;
        self.cards.shuffle(rng);
    }
}

/// Collection of all zones for one side
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerZones {
    pub library: CardZone,
    pub hand: CardZone,
    pub field: CardZone,
    pub resource_row: CardZone,
    pub graveyard: CardZone,
}

impl PlayerZones {
    pub fn new(side: Side) -> Self {
        PlayerZones {
            library: CardZone::new(Zone::Library, side),
            hand: CardZone::new(Zone::Hand, side),
            field: CardZone::new(Zone::Field, side),
            resource_row: CardZone::new(Zone::ResourceRow, side),
            graveyard: CardZone::new(Zone::Graveyard, side),
        }
    }

    pub fn get_zone(&self, zone: Zone) -> Option<&CardZone> {
        match zone {
            Zone::Library => Some(&self.library),
            Zone::Hand => Some(&self.hand),
            Zone::Field => Some(&self.field),
            Zone::ResourceRow => Some(&self.resource_row),
            Zone::Graveyard => Some(&self.graveyard),
            Zone::Stack => None,
        }
    }

    pub fn get_zone_mut(&mut self, zone: Zone) -> Option<&mut CardZone> {
        match zone {
            Zone::Library => Some(&mut self.library),
            Zone::Hand => Some(&mut self.hand),
            Zone::Field => Some(&mut self.field),
            Zone::ResourceRow => Some(&mut self.resource_row),
            Zone::Graveyard => Some(&mut self.graveyard),
            Zone::Stack => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_zone() {
        let mut zone = CardZone::new(Zone::Hand, Side::Player);
        assert!(zone.is_empty());

        let card1 = CardId::new(10);
        let card2 = CardId::new(11);
        zone.add(card1);
        zone.add(card2);

        assert_eq!(zone.len(), 2);
        assert!(zone.remove(card1));
        assert!(!zone.remove(card1));
        assert_eq!(zone.cards, vec![card2]);
    }

    #[test]
    fn test_library_draws_from_top() {
        let mut library = CardZone::new(Zone::Library, Side::Opponent);
        library.add(CardId::new(1));
        library.add(CardId::new(2));

        assert_eq!(library.draw_top(), Some(CardId::new(2)));
        assert_eq!(library.draw_top(), Some(CardId::new(1)));
        assert_eq!(library.draw_top(), None);
    }

    #[test]
    fn test_stack_has_no_player_zone() {
        let zones = PlayerZones::new(Side::Player);
        assert!(zones.get_zone(Zone::Stack).is_none());
        assert_eq!(zones.get_zone(Zone::ResourceRow).map(|z| z.owner), Some(Side::Player));
    }
}
