//! Phase sequencing and priority passing through the dispatcher

use azoth_rules::core::{CardId, Side};
use azoth_rules::game::{
    ActionDispatcher, CardTemplate, GameAction, GameEvent, GameState, Phase, TurnStructure,
};
use azoth_rules::zones::Zone;
use proptest::prelude::*;
use smallvec::SmallVec;

fn game_in(phase: Phase, active: Side) -> GameState {
    let mut game = GameState::new_two_player("Alice", "Bob", 20, Side::Player);
    game.turn.active_player = active;
    game.turn.phase = phase;
    game.turn.current_player = phase.first_priority(active);
    game.priority.grant(phase.first_priority(active));
    game
}

fn phase_strategy() -> impl Strategy<Value = Phase> {
    prop::sample::select(Phase::ALL.to_vec())
}

fn side_strategy() -> impl Strategy<Value = Side> {
    prop::sample::select(Side::BOTH.to_vec())
}

fn pass_twice(game: &mut GameState) -> Vec<GameEvent> {
    let first = game.priority.holder();
    let mut dispatcher = ActionDispatcher::new(game);
    dispatcher.submit(first, &GameAction::PassPriority).unwrap();
    dispatcher.submit(first.other(), &GameAction::PassPriority).unwrap();
    dispatcher.finish()
}

fn summon_free_creature(game: &mut GameState, side: Side) -> CardId {
    let card = game
        .add_card(side, Zone::Hand, &CardTemplate::summon("Imp", 0, 1, 1))
        .unwrap();
    let mut dispatcher = ActionDispatcher::new(game);
    dispatcher
        .submit(
            side,
            &GameAction::Summon {
                card,
                payment: SmallVec::new(),
            },
        )
        .unwrap();
    card
}

proptest! {
    #[test]
    fn twelve_advances_return_to_untap(first in side_strategy()) {
        // Starting on the second player's turn, one full cycle hands the
        // turn back to the first player and bumps the turn number.
        let mut turn = TurnStructure::new(first);
        turn.active_player = first.other();
        turn.current_player = first.other();
        let before = turn.turn_number;

        for i in 0..12 {
            let advance = turn.next_phase();
            prop_assert_eq!(advance.turn_change.is_some(), i == 11);
        }
        prop_assert_eq!(turn.phase, Phase::Untap);
        prop_assert_eq!(turn.active_player, first);
        prop_assert_eq!(turn.turn_number, before + 1);
    }

    #[test]
    fn two_passes_on_empty_stack_equal_one_advance(
        phase in phase_strategy(),
        active in side_strategy(),
    ) {
        let mut game = game_in(phase, active);
        let mut expected = game.turn.clone();
        let advance = expected.next_phase();

        let events = pass_twice(&mut game);

        prop_assert_eq!(game.turn.phase, advance.to);
        prop_assert_eq!(game.turn.active_player, expected.active_player);
        prop_assert_eq!(game.turn.turn_number, expected.turn_number);
        prop_assert_eq!(game.priority.passed_in_succession(), 0);

        let phase_changes = events
            .iter()
            .filter(|e| matches!(e, GameEvent::PhaseChanged { .. }))
            .count();
        prop_assert_eq!(phase_changes, 1);
    }

    #[test]
    fn two_passes_resolve_exactly_one_entry(
        entries in 1usize..5,
        phase in prop::sample::select(vec![Phase::Main1, Phase::Main2]),
    ) {
        let mut game = game_in(phase, Side::Player);
        let mut pushed = Vec::new();
        for _ in 0..entries {
            pushed.push(summon_free_creature(&mut game, Side::Player));
        }
        prop_assert_eq!(game.priority.stack().len(), entries);

        pass_twice(&mut game);

        prop_assert_eq!(game.priority.stack().len(), entries - 1);
        prop_assert_eq!(game.turn.phase, phase);
        prop_assert!(game.zones(Side::Player).field.contains(*pushed.last().unwrap()));
        prop_assert_eq!(game.priority.passed_in_succession(), 0);
    }

    #[test]
    fn pass_counter_never_exceeds_one_between_events(
        moves in prop::collection::vec(any::<bool>(), 1..60),
    ) {
        // true = pass, false = play a free creature when allowed
        let mut game = game_in(Phase::Main1, Side::Player);
        for pass in moves {
            if game.is_game_over() {
                break;
            }
            let holder = game.priority.holder();
            let can_play = !pass
                && game.turn.phase.is_main()
                && holder == game.turn.active_player;
            if can_play {
                summon_free_creature(&mut game, holder);
            } else {
                let mut dispatcher = ActionDispatcher::new(&mut game);
                dispatcher.submit(holder, &GameAction::PassPriority).unwrap();
            }
            prop_assert!(game.priority.passed_in_succession() <= 1);
        }
    }
}

#[test]
fn test_cleanup_wraps_exactly_once() {
    let mut game = game_in(Phase::Cleanup, Side::Player);
    let events = pass_twice(&mut game);

    let turn_changes: Vec<&GameEvent> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::TurnChanged { .. }))
        .collect();
    assert_eq!(
        turn_changes,
        vec![&GameEvent::TurnChanged {
            active_player: Side::Opponent,
            turn_number: 1
        }]
    );
    assert_eq!(game.turn.phase, Phase::Untap);
    assert_eq!(game.priority.holder(), Side::Opponent);
}

#[test]
fn test_blocker_step_gives_defender_first_priority() {
    let mut game = game_in(Phase::CombatAttackers, Side::Player);
    pass_twice(&mut game);

    assert_eq!(game.turn.phase, Phase::CombatBlockers);
    assert_eq!(game.priority.holder(), Side::Opponent);
    assert_eq!(game.turn.current_player, Side::Opponent);
    assert_eq!(game.turn.active_player, Side::Player);
}

#[test]
fn test_action_keeps_priority_and_resets_count() {
    let mut game = game_in(Phase::Main1, Side::Player);
    summon_free_creature(&mut game, Side::Player);
    assert_eq!(game.priority.holder(), Side::Player);
    assert_eq!(game.priority.passed_in_succession(), 0);

    {
        let mut dispatcher = ActionDispatcher::new(&mut game);
        dispatcher.submit(Side::Player, &GameAction::PassPriority).unwrap();
    }
    assert_eq!(game.priority.passed_in_succession(), 1);

    // The resolution resets the count and play continues in the same phase
    {
        let mut dispatcher = ActionDispatcher::new(&mut game);
        dispatcher.submit(Side::Opponent, &GameAction::PassPriority).unwrap();
    }
    assert_eq!(game.priority.passed_in_succession(), 0);
    assert_eq!(game.priority.holder(), Side::Player);

    summon_free_creature(&mut game, Side::Player);
    {
        let mut dispatcher = ActionDispatcher::new(&mut game);
        dispatcher.submit(Side::Player, &GameAction::PassPriority).unwrap();
        assert!(dispatcher.submit(Side::Player, &GameAction::PassPriority).is_err());
    }
    assert_eq!(game.priority.passed_in_succession(), 1);
    assert_eq!(game.turn.phase, Phase::Main1);
    assert_eq!(game.zones(Side::Player).field.len(), 1);
}

#[test]
fn test_declared_attackers_keep_priority_with_active_player() {
    let mut game = game_in(Phase::CombatAttackers, Side::Player);
    let bear = game
        .add_card(Side::Player, Zone::Field, &CardTemplate::summon("Bear", 2, 2, 2))
        .unwrap();

    let mut dispatcher = ActionDispatcher::new(&mut game);
    dispatcher
        .submit(
            Side::Player,
            &GameAction::DeclareAttackers {
                attackers: SmallVec::from_slice(&[bear]),
            },
        )
        .unwrap();
    dispatcher.finish();

    assert_eq!(game.priority.holder(), Side::Player);
    assert_eq!(game.priority.passed_in_succession(), 0);
    assert!(game.card(bear).unwrap().tapped);
    assert!(game.combat.is_attacking(bear));
}
