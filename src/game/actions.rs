//! Game actions and the dispatcher that applies them
//!
//! Every submission is validated in full before anything is mutated, so a
//! rejected action leaves the state untouched and emits no events.

use crate::core::{CardId, CardKind, Side};
use crate::game::events::{ActionPrompt, GameEvent};
use crate::game::phase::{Phase, PhaseAdvance};
use crate::game::priority::{PassOutcome, StackEffect, StackEntry};
use crate::game::state::{GameEndReason, GameOutcome};
use crate::game::GameState;
use crate::zones::Zone;
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Action submissions accepted from either side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameAction {
    /// Put a hand card face-up in the resource row (once per turn)
    CommitResource { card: CardId },

    /// Play a summon card, tapping `payment` resources
    Summon {
        card: CardId,
        payment: SmallVec<[CardId; 8]>,
    },

    /// Play an effect card
    Cast {
        card: CardId,
        payment: SmallVec<[CardId; 8]>,
        targets: SmallVec<[CardId; 2]>,
    },

    /// Declare this turn's attackers (may be empty)
    DeclareAttackers { attackers: SmallVec<[CardId; 8]> },

    /// Declare (blocker, attacker) pairs
    DeclareBlockers { blocks: SmallVec<[(CardId, CardId); 8]> },

    PassPriority,

    /// Skip the rest of the phase (active player, empty stack)
    EndPhase,
}

impl GameAction {
    pub fn kind_name(&self) -> &'static str {
        match self {
            GameAction::CommitResource { .. } => "commit_resource",
            GameAction::Summon { .. } => "summon",
            GameAction::Cast { .. } => "cast",
            GameAction::DeclareAttackers { .. } => "declare_attackers",
            GameAction::DeclareBlockers { .. } => "declare_blockers",
            GameAction::PassPriority => "pass_priority",
            GameAction::EndPhase => "end_phase",
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, GameAction::PassPriority)
    }
}

impl fmt::Display for GameAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameAction::CommitResource { card } => write!(f, "commits {card} as a resource"),
            GameAction::Summon { card, payment } => {
                write!(f, "summons {card} paying {}", payment.len())
            }
            GameAction::Cast { card, targets, .. } if targets.is_empty() => {
                write!(f, "casts {card}")
            }
            GameAction::Cast { card, targets, .. } => {
                write!(f, "casts {card} targeting {}", join_ids(targets))
            }
            GameAction::DeclareAttackers { attackers } if attackers.is_empty() => {
                write!(f, "declares no attackers")
            }
            GameAction::DeclareAttackers { attackers } => {
                write!(f, "attacks with {}", join_ids(attackers))
            }
            GameAction::DeclareBlockers { blocks } if blocks.is_empty() => {
                write!(f, "declares no blockers")
            }
            GameAction::DeclareBlockers { blocks } => {
                let pairs: Vec<String> = blocks.iter().map(|(b, a)| format!("{b}->{a}")).collect();
                write!(f, "blocks {}", pairs.join(", "))
            }
            GameAction::PassPriority => write!(f, "passes priority"),
            GameAction::EndPhase => write!(f, "ends the phase"),
        }
    }
}

fn join_ids(ids: &[CardId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

/// The single mutator of `GameState`
///
/// Collects the events produced by each operation; the caller drains them
/// with `finish`.
pub struct ActionDispatcher<'a> {
    game: &'a mut GameState,
    events: Vec<GameEvent>,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(game: &'a mut GameState) -> Self {
        ActionDispatcher {
            game,
            events: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<GameEvent> {
        self.events
    }

    fn emit(&mut self, event: GameEvent) {
        self.game.logger.event(&event);
        self.events.push(event);
    }

    /// Announce the match and enter the first player's untap
    pub fn start_game(&mut self) -> Result<()> {
        let first_player = self.game.turn.first_player;
        self.emit(GameEvent::GameStarted { first_player });
        self.emit(GameEvent::TurnChanged {
            active_player: first_player,
            turn_number: self.game.turn.turn_number,
        });
        self.enter_phase(self.game.turn.phase)
    }

    /// Validate and apply one submission from `side`
    pub fn submit(&mut self, side: Side, action: &GameAction) -> Result<()> {
        if self.game.is_game_over() {
            return Err(EngineError::GameOver);
        }
        if self.game.priority.holder() != side {
            return Err(EngineError::NotYourPriority(side));
        }

        match action {
            GameAction::PassPriority => {
                self.emit(GameEvent::ActionTaken {
                    side,
                    action: action.clone(),
                });
                return self.pass_priority();
            }
            GameAction::EndPhase => {
                self.check_end_phase(side)?;
                self.emit(GameEvent::ActionTaken {
                    side,
                    action: action.clone(),
                });
                return self.advance_phase();
            }
            GameAction::CommitResource { card } => {
                self.check_commit(side, *card)?;
                self.game.move_card(*card, Zone::Hand, Zone::ResourceRow)?;
                self.game.player_mut(side).resource_committed = true;
            }
            GameAction::Summon { card, payment } => {
                self.check_play(side, *card, payment, CardKind::Summon)?;
                self.pay_and_stack(side, *card, payment, StackEffect::Summon)?;
            }
            GameAction::Cast {
                card,
                payment,
                targets,
            } => {
                self.check_play(side, *card, payment, CardKind::Effect)?;
                self.check_targets(*card, targets)?;
                let effect = StackEffect::Effect {
                    targets: targets.clone(),
                };
                self.pay_and_stack(side, *card, payment, effect)?;
            }
            GameAction::DeclareAttackers { attackers } => {
                self.check_attackers(side, attackers)?;
                for id in attackers {
                    self.game.card_mut(*id)?.tap();
                }
                self.game.combat.declare_attackers(attackers);
            }
            GameAction::DeclareBlockers { blocks } => {
                self.check_blockers(side, blocks)?;
                for (blocker, attacker) in blocks {
                    self.game.combat.declare_blocker(*blocker, *attacker);
                }
                self.game.combat.finish_blocks();
            }
        }

        self.game.priority.record_action();
        self.emit(GameEvent::ActionTaken {
            side,
            action: action.clone(),
        });
        Ok(())
    }

    fn pass_priority(&mut self) -> Result<()> {
        match self.game.priority.pass() {
            PassOutcome::Passed { to } => {
                self.emit(GameEvent::PriorityChanged { holder: to });
                Ok(())
            }
            PassOutcome::Resolve(entry) => {
                self.resolve(entry)?;
                let holder = self.game.priority.holder();
                self.emit(GameEvent::PriorityChanged { holder });
                Ok(())
            }
            PassOutcome::AdvancePhase => self.advance_phase(),
        }
    }

    fn resolve(&mut self, entry: StackEntry) -> Result<()> {
        self.emit(GameEvent::ActionRequired(ActionPrompt::resolving()));
        match &entry.effect {
            StackEffect::Summon => {
                self.game.move_card(entry.source, Zone::Stack, Zone::Field)?;
                self.game.card_mut(entry.source)?.summoning_sick = true;
            }
            StackEffect::Effect { .. } => {
                self.game.move_card(entry.source, Zone::Stack, Zone::Graveyard)?;
            }
        }
        self.emit(GameEvent::StackResolved { entry });
        Ok(())
    }

    /// Move to the next phase and run its entry rules
    pub fn advance_phase(&mut self) -> Result<()> {
        let advance = self.game.turn.next_phase();
        self.announce(advance);
        self.enter_phase(advance.to)
    }

    /// Clock expiry: end the active player's turn from whatever phase
    ///
    /// Pending stack entries and combat are discarded and the next player
    /// starts at untap.
    pub fn force_end_turn(&mut self) -> Result<()> {
        if self.game.is_game_over() {
            return Ok(());
        }
        let side = self.game.turn.active_player;
        self.emit(GameEvent::TurnTimedOut { side });
        self.emit(GameEvent::ActionRequired(ActionPrompt::time_expired()));

        for entry in self.game.priority.clear_stack() {
            self.game.move_card(entry.source, Zone::Stack, Zone::Graveyard)?;
            self.emit(GameEvent::StackDiscarded { entry });
        }
        self.game.combat.clear();

        let advance = self.game.turn.force_turn_end();
        self.announce(advance);
        self.enter_phase(Phase::Untap)
    }

    /// End the match as a draw on the turn limit
    pub fn declare_turn_limit(&mut self) {
        self.end_game(None, GameEndReason::TurnLimit);
    }

    fn announce(&mut self, advance: PhaseAdvance) {
        self.emit(GameEvent::PhaseChanged {
            from: advance.from,
            to: advance.to,
        });
        if let Some(change) = advance.turn_change {
            self.emit(GameEvent::TurnChanged {
                active_player: change.active_player,
                turn_number: change.turn_number,
            });
        }
    }

    fn enter_phase(&mut self, phase: Phase) -> Result<()> {
        let active = self.game.turn.active_player;
        self.game.priority.grant(phase.first_priority(active));

        match phase {
            Phase::Untap => {
                self.game.untap_all(active)?;
                self.game.player_mut(active).reset_turn();
            }
            Phase::Draw => self.draw_step(active)?,
            Phase::CombatDamage => self.combat_damage(active)?,
            Phase::CombatEnd => self.game.combat.clear(),
            Phase::Cleanup => self.clear_damage()?,
            _ => {}
        }
        if self.game.is_game_over() {
            return Ok(());
        }

        let current = self.game.turn.current_player;
        if let Some(prompt) = ActionPrompt::for_phase(phase, active, current) {
            self.emit(GameEvent::ActionRequired(prompt));
        }
        let holder = self.game.priority.holder();
        self.emit(GameEvent::PriorityChanged { holder });
        Ok(())
    }

    fn draw_step(&mut self, active: Side) -> Result<()> {
        let turn = &self.game.turn;
        let skip =
            self.game.skip_first_draw && turn.turn_number == 1 && active == turn.first_player;
        if skip {
            return Ok(());
        }
        match self.game.draw_card(active)? {
            Some(_) => self.emit(GameEvent::CardDrawn { side: active }),
            None => self.end_game(Some(active.other()), GameEndReason::Decking),
        }
        Ok(())
    }

    fn combat_damage(&mut self, active: Side) -> Result<()> {
        let defender = active.other();
        let attackers: SmallVec<[CardId; 8]> = self.game.combat.attackers.clone();
        let mut to_defender: i32 = 0;

        for attacker in attackers {
            if !self.game.zones(active).field.contains(attacker) {
                continue;
            }
            let power = self.game.card(attacker)?.power;
            let blockers: SmallVec<[CardId; 4]> = self.game.combat.get_blockers(attacker).into();

            if blockers.is_empty() {
                to_defender += i32::from(power.max(0));
                continue;
            }

            // Lethal damage to each blocker in order, the rest to the last one
            let mut remaining = i32::from(power.max(0));
            for (i, blocker) in blockers.iter().enumerate() {
                let card = self.game.card(*blocker)?;
                let lethal = card.remaining_toughness().max(0);
                let assigned = if i + 1 == blockers.len() {
                    remaining
                } else {
                    remaining.min(lethal)
                };
                remaining -= assigned;
                let blocker_power = i32::from(card.power.max(0));

                let blocker_card = self.game.card_mut(*blocker)?;
                blocker_card.damage = blocker_card.damage.saturating_add(assigned);
                let attacker_card = self.game.card_mut(attacker)?;
                attacker_card.damage = attacker_card.damage.saturating_add(blocker_power);
            }
        }

        if to_defender > 0 {
            let player = self.game.player_mut(defender);
            player.lose_life(to_defender);
            let life = player.life;
            self.emit(GameEvent::LifeChanged {
                side: defender,
                life,
                delta: -to_defender,
            });
        }

        self.destroy_lethally_damaged()?;

        if self.game.player(defender).life <= 0 {
            self.end_game(Some(active), GameEndReason::LifeDepleted);
        }
        Ok(())
    }

    fn destroy_lethally_damaged(&mut self) -> Result<()> {
        for side in Side::BOTH {
            let dead: Vec<CardId> = self
                .game
                .creatures(side)
                .filter(|c| c.has_lethal_damage())
                .map(|c| c.id)
                .collect();
            for card in dead {
                self.game.move_card(card, Zone::Field, Zone::Graveyard)?;
                self.game.combat.remove_creature(card);
                self.emit(GameEvent::CreatureDestroyed { card, owner: side });
            }
        }
        Ok(())
    }

    fn clear_damage(&mut self) -> Result<()> {
        for side in Side::BOTH {
            let ids = self.game.zones(side).field.cards.clone();
            for id in ids {
                self.game.card_mut(id)?.damage = 0;
            }
        }
        Ok(())
    }

    fn end_game(&mut self, winner: Option<Side>, reason: GameEndReason) {
        if self.game.is_game_over() {
            return;
        }
        if let Some(winner) = winner {
            self.game.player_mut(winner.other()).has_lost = true;
        }
        let outcome = GameOutcome {
            winner,
            reason,
            turn_number: self.game.turn.turn_number,
        };
        self.game.outcome = Some(outcome);
        self.emit(GameEvent::GameOver(outcome));
    }

    fn pay_and_stack(
        &mut self,
        side: Side,
        card: CardId,
        payment: &[CardId],
        effect: StackEffect,
    ) -> Result<()> {
        for id in payment {
            self.game.card_mut(*id)?.tap();
        }
        self.game.move_card(card, Zone::Hand, Zone::Stack)?;
        self.game.priority.push(card, side, effect);
        Ok(())
    }

    fn require_active(&self, side: Side, action: &'static str) -> Result<()> {
        if self.game.turn.active_player != side {
            return Err(EngineError::IllegalAction(format!(
                "{side} cannot {action} during the other player's turn"
            )));
        }
        Ok(())
    }

    fn check_end_phase(&self, side: Side) -> Result<()> {
        self.require_active(side, "end the phase")?;
        if !self.game.priority.stack_is_empty() {
            return Err(EngineError::IllegalAction(
                "cannot end the phase with spells on the stack".to_string(),
            ));
        }
        Ok(())
    }

    fn check_commit(&self, side: Side, card: CardId) -> Result<()> {
        self.require_active(side, "commit a resource")?;
        let phase = self.game.turn.phase;
        if !phase.allows_resource_commit() {
            return Err(EngineError::WrongPhase {
                action: "commit_resource",
                phase,
            });
        }
        if self.game.player(side).resource_committed {
            return Err(EngineError::IllegalAction(
                "a resource was already committed this turn".to_string(),
            ));
        }
        if !self.game.zones(side).hand.contains(card) {
            return Err(EngineError::IllegalAction(format!("{card} is not in hand")));
        }
        Ok(())
    }

    fn check_play(
        &self,
        side: Side,
        card: CardId,
        payment: &[CardId],
        kind: CardKind,
    ) -> Result<()> {
        let action = match kind {
            CardKind::Summon => "summon",
            CardKind::Effect => "cast",
        };
        self.require_active(side, action)?;
        let phase = self.game.turn.phase;
        if !phase.is_main() {
            return Err(EngineError::WrongPhase { action, phase });
        }
        if !self.game.zones(side).hand.contains(card) {
            return Err(EngineError::IllegalAction(format!("{card} is not in hand")));
        }
        let played = self.game.card(card)?;
        if played.kind != kind {
            return Err(EngineError::IllegalAction(format!(
                "{} cannot be played with {action}",
                played.name
            )));
        }

        let needed = usize::from(played.cost);
        let available = self.game.untapped_resources(side);
        if available.len() < needed {
            return Err(EngineError::InsufficientResources {
                needed,
                available: available.len(),
            });
        }
        if payment.len() != needed {
            return Err(EngineError::IllegalAction(format!(
                "payment must be exactly {needed} resources, got {}",
                payment.len()
            )));
        }
        for (i, id) in payment.iter().enumerate() {
            if !available.contains(id) {
                return Err(EngineError::IllegalAction(format!(
                    "{id} is not an untapped resource of {side}"
                )));
            }
            if payment[..i].contains(id) {
                return Err(EngineError::IllegalAction(format!("{id} used twice in payment")));
            }
        }
        Ok(())
    }

    fn check_targets(&self, card: CardId, targets: &[CardId]) -> Result<()> {
        if self.game.card(card)?.requires_target && targets.is_empty() {
            return Err(EngineError::IllegalAction(format!("{card} requires a target")));
        }
        for target in targets {
            let on_field = Side::BOTH
                .iter()
                .any(|s| self.game.zones(*s).field.contains(*target));
            if !on_field {
                return Err(EngineError::IllegalAction(format!(
                    "{target} is not a permanent on the field"
                )));
            }
        }
        Ok(())
    }

    fn check_attackers(&self, side: Side, attackers: &[CardId]) -> Result<()> {
        self.require_active(side, "attack")?;
        let phase = self.game.turn.phase;
        if phase != Phase::CombatAttackers {
            return Err(EngineError::WrongPhase {
                action: "declare_attackers",
                phase,
            });
        }
        if self.game.combat.attackers_declared {
            return Err(EngineError::IllegalAction(
                "attackers were already declared".to_string(),
            ));
        }
        for (i, id) in attackers.iter().enumerate() {
            if !self.game.zones(side).field.contains(*id) || attackers[..i].contains(id) {
                return Err(EngineError::IllegalAction(format!("{id} cannot attack")));
            }
            if !self.game.card(*id)?.can_attack() {
                return Err(EngineError::IllegalAction(format!(
                    "{id} is tapped or summoning sick"
                )));
            }
        }
        Ok(())
    }

    fn check_blockers(&self, side: Side, blocks: &[(CardId, CardId)]) -> Result<()> {
        if self.game.turn.active_player == side {
            return Err(EngineError::IllegalAction(
                "the attacking player cannot block".to_string(),
            ));
        }
        let phase = self.game.turn.phase;
        if phase != Phase::CombatBlockers {
            return Err(EngineError::WrongPhase {
                action: "declare_blockers",
                phase,
            });
        }
        if self.game.combat.blockers_declared {
            return Err(EngineError::IllegalAction(
                "blockers were already declared".to_string(),
            ));
        }
        for (i, (blocker, attacker)) in blocks.iter().enumerate() {
            let reused = blocks[..i].iter().any(|(b, _)| b == blocker);
            if reused || !self.game.zones(side).field.contains(*blocker) {
                return Err(EngineError::IllegalAction(format!("{blocker} cannot block")));
            }
            if !self.game.card(*blocker)?.can_block() {
                return Err(EngineError::IllegalAction(format!("{blocker} is tapped")));
            }
            if !self.game.combat.is_attacking(*attacker) {
                return Err(EngineError::IllegalAction(format!("{attacker} is not attacking")));
            }
        }
        Ok(())
    }
}
