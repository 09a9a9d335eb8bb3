//! Combat declarations for the current turn
//!
//! Tracks declared attackers and blockers; damage itself is dealt by the
//! dispatcher when combat damage begins.

use crate::core::CardId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;

/// Combat state for the current combat
///
/// Uses BTreeMap for deterministic iteration order. Reset at end of combat.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CombatState {
    /// Attacking creatures in declaration order
    pub attackers: SmallVec<[CardId; 8]>,

    /// Blocker -> the attacker it blocks
    pub blockers: BTreeMap<CardId, CardId>,

    /// Reverse mapping: attacker -> blockers, in assignment order
    pub attacker_blockers: BTreeMap<CardId, SmallVec<[CardId; 4]>>,

    pub attackers_declared: bool,
    pub blockers_declared: bool,
}

impl CombatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_attackers(&mut self, attackers: &[CardId]) {
        self.attackers.extend(attackers.iter().copied());
        self.attackers_declared = true;
    }

    pub fn declare_blocker(&mut self, blocker: CardId, attacker: CardId) {
        self.blockers.insert(blocker, attacker);
        self.attacker_blockers.entry(attacker).or_default().push(blocker);
    }

    pub fn finish_blocks(&mut self) {
        self.blockers_declared = true;
    }

    pub fn is_attacking(&self, card_id: CardId) -> bool {
        self.attackers.contains(&card_id)
    }

    pub fn is_blocking(&self, card_id: CardId) -> bool {
        self.blockers.contains_key(&card_id)
    }

    pub fn is_blocked(&self, attacker: CardId) -> bool {
        self.attacker_blockers
            .get(&attacker)
            .is_some_and(|blockers| !blockers.is_empty())
    }

    pub fn get_blockers(&self, attacker: CardId) -> &[CardId] {
        self.attacker_blockers
            .get(&attacker)
            .map(|b| b.as_slice())
            .unwrap_or(&[])
    }

    /// Forget a creature that left the field mid-combat
    pub fn remove_creature(&mut self, card_id: CardId) {
        self.attackers.retain(|a| *a != card_id);
        self.attacker_blockers.remove(&card_id);
        if let Some(attacker) = self.blockers.remove(&card_id) {
            if let Some(list) = self.attacker_blockers.get_mut(&attacker) {
                list.retain(|b| *b != card_id);
            }
        }
    }

    /// Clear all combat state (called at end of combat)
    pub fn clear(&mut self) {
        self.attackers.clear();
        self.blockers.clear();
        self.attacker_blockers.clear();
        self.attackers_declared = false;
        self.blockers_declared = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_attackers() {
        let mut combat = CombatState::new();
        combat.declare_attackers(&[CardId::new(1), CardId::new(2)]);
        assert!(combat.attackers_declared);
        assert!(combat.is_attacking(CardId::new(2)));
        assert!(!combat.is_blocked(CardId::new(1)));
    }

    #[test]
    fn test_declare_blocker() {
        let mut combat = CombatState::new();
        let attacker = CardId::new(1);
        let blocker = CardId::new(3);
        combat.declare_attackers(&[attacker]);
        combat.declare_blocker(blocker, attacker);

        assert!(combat.is_blocking(blocker));
        assert!(combat.is_blocked(attacker));
        assert_eq!(combat.get_blockers(attacker), &[blocker]);
    }

    #[test]
    fn test_remove_creature_unlinks_block() {
        let mut combat = CombatState::new();
        let attacker = CardId::new(1);
        let blocker = CardId::new(3);
        combat.declare_attackers(&[attacker]);
        combat.declare_blocker(blocker, attacker);

        combat.remove_creature(blocker);
        assert!(!combat.is_blocked(attacker));
        assert!(combat.is_attacking(attacker));
    }

    #[test]
    fn test_clear_combat() {
        let mut combat = CombatState::new();
        combat.declare_attackers(&[CardId::new(1)]);
        combat.finish_blocks();
        combat.clear();
        assert!(combat.attackers.is_empty());
        assert!(!combat.attackers_declared);
        assert!(!combat.blockers_declared);
    }
}
