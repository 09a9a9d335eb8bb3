//! Decision profile generation across difficulty tiers

use azoth_rules::core::Side;
use azoth_rules::game::{
    DecisionKind, DecisionParameterProfile, Difficulty, HeuristicController, PlayerController,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

const KINDS: [DecisionKind; 4] = [
    DecisionKind::Simple,
    DecisionKind::Normal,
    DecisionKind::Complex,
    DecisionKind::Critical,
];

fn difficulty_strategy() -> impl Strategy<Value = Difficulty> {
    prop::sample::select(Difficulty::ALL.to_vec())
}

#[test]
fn test_harder_tiers_think_faster_and_err_less() {
    for pair in Difficulty::ALL.windows(2) {
        let easier = pair[0].parameters();
        let harder = pair[1].parameters();
        assert!(harder.decision_delay_base_ms < easier.decision_delay_base_ms);
        assert!(harder.mistake_chance < easier.mistake_chance);
        assert!(harder.variability_factor < easier.variability_factor);
        assert!(harder.emote_frequency < easier.emote_frequency);
    }
}

#[test]
fn test_kind_multipliers_grow_with_weight() {
    let multipliers: Vec<f64> = KINDS.iter().map(DecisionKind::multiplier).collect();
    assert!(multipliers.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_difficulty_change_replaces_whole_profile() {
    let mut ai = HeuristicController::new(Side::Opponent, Difficulty::Beginner, 5)
        .with_thinking_time_multiplier(1.5);
    assert!(PlayerController::set_difficulty(&mut ai, Difficulty::Mythic, 6));

    let profile = ai.profile();
    let mythic = DecisionParameterProfile::generate(Difficulty::Mythic, 6);
    assert_eq!(profile.difficulty, Difficulty::Mythic);
    assert_eq!(profile.personality, mythic.personality);
    assert_eq!(profile.mistake_chance, 0.01);
    assert_eq!(profile.decision_delay_base_ms, 800);
    // The pacing knob belongs to the seat, not the tier
    assert_eq!(profile.thinking_time_multiplier, 1.5);
}

proptest! {
    #[test]
    fn generation_is_a_pure_function(difficulty in difficulty_strategy(), seed in any::<u64>()) {
        prop_assert_eq!(
            DecisionParameterProfile::generate(difficulty, seed),
            DecisionParameterProfile::generate(difficulty, seed)
        );
    }

    #[test]
    fn traits_stay_inside_tier_ranges(difficulty in difficulty_strategy(), seed in any::<u64>()) {
        let params = difficulty.parameters();
        let profile = DecisionParameterProfile::generate(difficulty, seed);
        let p = profile.personality;

        prop_assert!(params.aggressiveness.contains(&p.aggressiveness));
        prop_assert!(params.risk_tolerance.contains(&p.risk_tolerance));
        prop_assert!(params.creativity.contains(&p.creativity));
        prop_assert!(params.patience.contains(&p.patience));
        prop_assert!(params.adaptability.contains(&p.adaptability));
        prop_assert!(p.emotionality <= 100);

        let scale = 0.5 + f64::from(p.emotionality) / 100.0;
        prop_assert!((profile.emote_frequency - params.emote_frequency * scale).abs() < 1e-12);
        prop_assert!(profile.emote_frequency >= params.emote_frequency * 0.5 - 1e-12);
        prop_assert!(profile.emote_frequency <= params.emote_frequency * 1.5 + 1e-12);
    }

    #[test]
    fn delays_stay_inside_jitter_bounds(
        difficulty in difficulty_strategy(),
        seed in any::<u64>(),
        rng_seed in any::<u64>(),
        multiplier in 0.1f64..4.0,
    ) {
        let profile = DecisionParameterProfile::generate(difficulty, seed)
            .with_thinking_time_multiplier(multiplier);
        let mut rng = ChaCha12Rng::seed_from_u64(rng_seed);

        for kind in KINDS {
            let (low, high) = profile.delay_bounds(kind);
            let delay = profile.decision_delay_ms(kind, &mut rng);
            prop_assert!(low <= delay && delay <= high, "{delay} outside [{low}, {high}]");
        }
    }
}
