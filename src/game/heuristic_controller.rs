//! Heuristic AI controller
//!
//! One handler per phase picks the heuristically best legal action, then a
//! perturbation step scaled by the decision profile may replace it with a
//! weaker candidate:
//!
//! - with probability `mistake_chance` a non-optimal candidate is picked
//!   (attacks ignore the bad-blocker check, individual blocks are dropped)
//! - with probability `variability_factor` ties for the best score are
//!   broken randomly instead of by hand/field order
//!
//! Every candidate is pre-checked for affordability and eligibility, so the
//! dispatcher should never reject what this controller proposes.

use crate::core::{Card, CardId, Side};
use crate::game::controller::{GameStateView, PlayerController};
use crate::game::emote::{EmoteBehavior, EmoteTrigger};
use crate::game::events::GameEvent;
use crate::game::phase::Phase;
use crate::game::profile::{DecisionKind, DecisionParameterProfile, Difficulty};
use crate::game::GameAction;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use smallvec::SmallVec;
use std::cmp::Reverse;

/// Life at or below which combat decisions count as critical
const CRITICAL_LIFE: i32 = 5;

pub struct HeuristicController {
    side: Side,
    profile: DecisionParameterProfile,
    rng: ChaCha12Rng,
    emotes: EmoteBehavior,
    apply_mistakes: bool,
}

impl HeuristicController {
    pub fn new(side: Side, difficulty: Difficulty, seed: u64) -> Self {
        Self::with_profile(side, DecisionParameterProfile::generate(difficulty, seed))
    }

    pub fn with_profile(side: Side, profile: DecisionParameterProfile) -> Self {
        HeuristicController {
            side,
            rng: ChaCha12Rng::seed_from_u64(profile.seed),
            profile,
            emotes: EmoteBehavior::new(),
            apply_mistakes: true,
        }
    }

    /// Disable the perturbation step (always play the heuristic optimum)
    pub fn without_mistakes(mut self) -> Self {
        self.apply_mistakes = false;
        self
    }

    pub fn with_thinking_time_multiplier(mut self, multiplier: f64) -> Self {
        self.profile = self.profile.with_thinking_time_multiplier(multiplier);
        self
    }

    pub fn profile(&self) -> &DecisionParameterProfile {
        &self.profile
    }

    /// Swap in a freshly generated profile for `difficulty`
    pub fn regenerate_profile(&mut self, difficulty: Difficulty, seed: u64) {
        let multiplier = self.profile.thinking_time_multiplier;
        self.profile = DecisionParameterProfile::generate(difficulty, seed)
            .with_thinking_time_multiplier(multiplier);
    }

    /// Choose an action for the current decision point
    ///
    /// Without a game state there is nothing to decide and the call is a
    /// no-op. With one, `None` means pass priority.
    pub fn decide(&mut self, view: Option<&GameStateView>) -> Option<GameAction> {
        let view = view?;
        if view.is_game_over() || !view.holds_priority() {
            return None;
        }

        let action = match view.phase() {
            Phase::Untap | Phase::Upkeep | Phase::End | Phase::Cleanup => auto_advance(view),
            Phase::Draw => self.resource_phase(view),
            Phase::Main1 | Phase::Main2 => self.main_phase(view),
            Phase::CombatAttackers => self.attack_phase(view),
            Phase::CombatBlockers => self.block_phase(view),
            Phase::CombatBegin | Phase::CombatDamage | Phase::CombatEnd => None,
        };

        if let Some(action) = &action {
            view.logger()
                .controller_choice("HEURISTIC", &format!("{} {action}", self.side));
        }
        action
    }

    pub fn decision_kind(&self, view: &GameStateView) -> DecisionKind {
        let phase = view.phase();
        if phase.is_combat() && view.life() <= CRITICAL_LIFE {
            return DecisionKind::Critical;
        }
        match phase {
            Phase::Main1 | Phase::Main2 => DecisionKind::Normal,
            Phase::CombatAttackers | Phase::CombatBlockers => DecisionKind::Complex,
            _ => DecisionKind::Simple,
        }
    }

    fn resource_phase(&mut self, view: &GameStateView) -> Option<GameAction> {
        if !view.is_active() || view.resource_committed() {
            return None;
        }
        let mut ranked: Vec<&Card> = view.hand_cards().collect();
        ranked.sort_by_key(|c| c.cost);
        let ties = count_ties(&ranked, |c| c.cost);
        let card = self.perturb(&ranked, ties)?;
        Some(GameAction::CommitResource { card: card.id })
    }

    fn main_phase(&mut self, view: &GameStateView) -> Option<GameAction> {
        if !view.is_active() || !view.stack_is_empty() {
            return None;
        }

        let summons = summon_candidates(view);
        let ties = count_ties(&summons, |c| Reverse(c.power));
        if let Some(card) = self.perturb(&summons, ties) {
            return Some(GameAction::Summon {
                card: card.id,
                payment: choose_payment(view, card.cost),
            });
        }

        let casts = cast_candidates(view);
        let ties = count_ties(&casts, |c| Reverse(c.cost));
        let card = self.perturb(&casts, ties)?;
        let targets = if card.requires_target {
            choose_target(view).into_iter().collect()
        } else {
            SmallVec::new()
        };
        Some(GameAction::Cast {
            card: card.id,
            payment: choose_payment(view, card.cost),
            targets,
        })
    }

    fn attack_phase(&mut self, view: &GameStateView) -> Option<GameAction> {
        if !view.is_active() || view.combat().attackers_declared {
            return None;
        }
        let careless = self.roll_mistake();
        let attackers = choose_attackers(view, !careless);
        if attackers.is_empty() {
            return None;
        }
        Some(GameAction::DeclareAttackers { attackers })
    }

    fn block_phase(&mut self, view: &GameStateView) -> Option<GameAction> {
        let combat = view.combat();
        if view.is_active() || combat.blockers_declared || combat.attackers.is_empty() {
            return None;
        }
        let mut blocks = choose_blockers(view);
        blocks.retain(|_| !self.roll_mistake());
        if blocks.is_empty() {
            return None;
        }
        Some(GameAction::DeclareBlockers { blocks })
    }

    fn roll_mistake(&mut self) -> bool {
        self.apply_mistakes && self.rng.gen_bool(self.profile.mistake_chance)
    }

    /// Pick from a best-first list, possibly perturbed
    ///
    /// `ties` is how many leading entries share the best score.
    fn perturb<T: Copy>(&mut self, ranked: &[T], ties: usize) -> Option<T> {
        let best = *ranked.first()?;
        if !self.apply_mistakes {
            return Some(best);
        }
        if ranked.len() > 1 && self.rng.gen_bool(self.profile.mistake_chance) {
            let i = self.rng.gen_range(1..ranked.len());
            return Some(ranked[i]);
        }
        if ties > 1 && self.rng.gen_bool(self.profile.variability_factor) {
            let i = self.rng.gen_range(0..ties);
            return Some(ranked[i]);
        }
        Some(best)
    }

    fn emote_trigger(&self, event: &GameEvent) -> Option<EmoteTrigger> {
        match event {
            GameEvent::GameStarted { .. } => Some(EmoteTrigger::GameStart),
            GameEvent::GameOver(_) => Some(EmoteTrigger::GameEnd),
            GameEvent::StackResolved { entry } if entry.controller != self.side => {
                Some(EmoteTrigger::GoodPlay)
            }
            GameEvent::CreatureDestroyed { owner, .. } if *owner == self.side => {
                Some(EmoteTrigger::BadPlay)
            }
            GameEvent::LifeChanged { side, life, .. } if *side == self.side => {
                if *life <= CRITICAL_LIFE {
                    Some(EmoteTrigger::LosingPosition)
                } else {
                    Some(EmoteTrigger::TakingDamage)
                }
            }
            GameEvent::LifeChanged { side, life, .. }
                if *side != self.side && *life <= CRITICAL_LIFE =>
            {
                Some(EmoteTrigger::WinningPosition)
            }
            _ => None,
        }
    }
}

impl PlayerController for HeuristicController {
    fn side(&self) -> Side {
        self.side
    }

    fn decision_delay_ms(&mut self, view: &GameStateView) -> u64 {
        let kind = self.decision_kind(view);
        self.profile.decision_delay_ms(kind, &mut self.rng)
    }

    fn choose_action(&mut self, view: &GameStateView) -> Option<GameAction> {
        self.decide(Some(view))
    }

    fn observe(&mut self, event: &GameEvent, now_ms: u64) -> Option<String> {
        let trigger = self.emote_trigger(event)?;
        self.emotes
            .maybe_emote(trigger, self.profile.emote_frequency, now_ms, &mut self.rng)
            .map(str::to_string)
    }

    fn set_difficulty(&mut self, difficulty: Difficulty, seed: u64) -> bool {
        self.regenerate_profile(difficulty, seed);
        true
    }
}

/// Nothing to decide: the active player ends the phase, the other passes
fn auto_advance(view: &GameStateView) -> Option<GameAction> {
    (view.is_active() && view.stack_is_empty()).then_some(GameAction::EndPhase)
}

fn count_ties<T, K: PartialEq>(ranked: &[T], key: impl Fn(&T) -> K) -> usize {
    match ranked.first() {
        Some(first) => {
            let best = key(first);
            ranked.iter().take_while(|c| key(c) == best).count()
        }
        None => 0,
    }
}

/// Hand card with the lowest cost (first in hand order on ties)
pub fn choose_resource_card(view: &GameStateView) -> Option<CardId> {
    view.hand_cards().min_by_key(|c| c.cost).map(|c| c.id)
}

/// Affordable summons, highest power first
pub fn summon_candidates<'a>(view: &GameStateView<'a>) -> Vec<&'a Card> {
    let available = view.untapped_resources().len();
    let mut candidates: Vec<&Card> = view
        .hand_cards()
        .filter(|c| c.is_summon() && usize::from(c.cost) <= available)
        .collect();
    candidates.sort_by_key(|c| Reverse(c.power));
    candidates
}

/// Affordable effects with a legal target when one is needed, highest cost first
pub fn cast_candidates<'a>(view: &GameStateView<'a>) -> Vec<&'a Card> {
    let available = view.untapped_resources().len();
    let has_target = choose_target(view).is_some();
    let mut candidates: Vec<&Card> = view
        .hand_cards()
        .filter(|c| c.is_effect() && usize::from(c.cost) <= available)
        .filter(|c| !c.requires_target || has_target)
        .collect();
    candidates.sort_by_key(|c| Reverse(c.cost));
    candidates
}

pub fn choose_summon(view: &GameStateView) -> Option<CardId> {
    summon_candidates(view).first().map(|c| c.id)
}

pub fn choose_cast(view: &GameStateView) -> Option<CardId> {
    cast_candidates(view).first().map(|c| c.id)
}

/// The first `cost` untapped resources in row order
pub fn choose_payment(view: &GameStateView, cost: u8) -> SmallVec<[CardId; 8]> {
    view.untapped_resources()
        .into_iter()
        .take(usize::from(cost))
        .collect()
}

/// The opponent's highest-power permanent
pub fn choose_target(view: &GameStateView) -> Option<CardId> {
    view.opponent_creatures()
        .min_by_key(|c| Reverse(c.power))
        .map(|c| c.id)
}

/// A blocker that kills `attacker` and survives the exchange
pub fn is_bad_blocker(blocker: &Card, attacker: &Card) -> bool {
    blocker.toughness >= attacker.power && blocker.power >= attacker.toughness
}

/// Eligible attackers, optionally dropping those a single blocker punishes
pub fn choose_attackers(view: &GameStateView, avoid_bad_blocks: bool) -> SmallVec<[CardId; 8]> {
    let blockers: SmallVec<[&Card; 8]> =
        view.opponent_creatures().filter(|c| c.can_block()).collect();

    view.creatures()
        .filter(|c| c.can_attack())
        .filter(|attacker| {
            !avoid_bad_blocks || !blockers.iter().any(|b| is_bad_blocker(b, attacker))
        })
        .map(|c| c.id)
        .collect()
}

/// Assign blocks against the declared attackers
///
/// Attackers are handled strongest first; each takes the weakest free
/// blocker that either survives the hit or trades with it.
pub fn choose_blockers(view: &GameStateView) -> SmallVec<[(CardId, CardId); 8]> {
    let mut attackers: SmallVec<[&Card; 8]> = view
        .combat()
        .attackers
        .iter()
        .filter_map(|id| view.card(*id))
        .collect();
    attackers.sort_by_key(|c| Reverse(c.power));

    let mut blockers: SmallVec<[&Card; 8]> = view.creatures().filter(|c| c.can_block()).collect();
    blockers.sort_by_key(|c| c.power);

    let mut used: SmallVec<[CardId; 8]> = SmallVec::new();
    let mut blocks = SmallVec::new();
    for attacker in attackers {
        let found = blockers.iter().find(|b| {
            let survives = b.toughness > attacker.power;
            let trades = b.toughness >= attacker.power && b.power >= attacker.toughness;
            !used.contains(&b.id) && (survives || trades)
        });
        if let Some(blocker) = found {
            used.push(blocker.id);
            blocks.push((blocker.id, attacker.id));
        }
    }
    blocks
}
