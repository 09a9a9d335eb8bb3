//! Turn clock behaviour, standalone and inside the game loop

use azoth_rules::core::Side;
use azoth_rules::game::{
    CardTemplate, ClockEvent, GameAction, GameEvent, GameLoop, GameState, ManualController, Phase,
    ScriptedController, TurnClock, VerbosityLevel,
};
use azoth_rules::zones::Zone;
use proptest::prelude::*;
use smallvec::SmallVec;
use std::collections::BTreeSet;

fn manual_loop(game: GameState) -> GameLoop {
    GameLoop::new(
        game,
        Box::new(ManualController::new(Side::Player)),
        Box::new(ManualController::new(Side::Opponent)),
    )
    .unwrap()
    .with_verbosity(VerbosityLevel::Silent)
}

fn warnings(events: &[GameEvent]) -> Vec<u32> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::TimeWarning { seconds_remaining } => Some(*seconds_remaining),
            _ => None,
        })
        .collect()
}

fn timeouts(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::TurnTimedOut { .. }))
        .count()
}

#[test]
fn test_full_budget_times_out_exactly_once() {
    let game = GameState::new_two_player("Alice", "Bob", 20, Side::Player);
    let mut game_loop = manual_loop(game);
    game_loop.advance_to(299_000).unwrap();
    let early = game_loop.take_events();
    assert_eq!(warnings(&early), vec![60, 30, 10]);
    assert_eq!(timeouts(&early), 0);
    assert_eq!(game_loop.clock().remaining_secs(), 1);

    game_loop.advance_to(300_000).unwrap();
    let events = game_loop.take_events();
    assert_eq!(timeouts(&events), 1);
    assert!(events.contains(&GameEvent::TurnTimedOut { side: Side::Player }));
    assert!(events.contains(&GameEvent::TurnChanged {
        active_player: Side::Opponent,
        turn_number: 1
    }));
    assert_eq!(game_loop.game.turn.phase, Phase::Untap);
    assert_eq!(game_loop.clock().remaining_secs(), 300);
    assert!(!game_loop.clock().is_expired());
}

#[test]
fn test_clock_rearms_for_the_next_turn() {
    let game = GameState::new_two_player("Alice", "Bob", 20, Side::Player);
    let mut game_loop = manual_loop(game);
    game_loop.advance_to(600_000).unwrap();

    let events = game_loop.take_events();
    assert_eq!(timeouts(&events), 2);
    assert_eq!(warnings(&events), vec![60, 30, 10, 60, 30, 10]);
    assert_eq!(game_loop.game.turn.active_player, Side::Player);
    assert_eq!(game_loop.game.turn.turn_number, 2);
}

#[test]
fn test_forced_end_clears_pass_count_and_stack() {
    let mut game = GameState::new_two_player("Alice", "Bob", 20, Side::Player);
    game.turn.phase = Phase::Main1;
    let imp = game
        .add_card(Side::Player, Zone::Hand, &CardTemplate::summon("Imp", 0, 1, 1))
        .unwrap();
    let mut game_loop = manual_loop(game).with_clock(5, &[]);
    game_loop.start().unwrap();

    game_loop
        .submit(
            Side::Player,
            GameAction::Summon {
                card: imp,
                payment: SmallVec::new(),
            },
        )
        .unwrap();
    game_loop.submit(Side::Player, GameAction::PassPriority).unwrap();
    assert_eq!(game_loop.game.priority.passed_in_succession(), 1);
    game_loop.take_events();

    game_loop.advance_to(5_000).unwrap();
    let events = game_loop.take_events();

    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::StackDiscarded { entry } if entry.source == imp)));
    assert_eq!(game_loop.game.priority.passed_in_succession(), 0);
    assert!(game_loop.game.priority.stack().is_empty());
    assert!(game_loop.game.zones(Side::Player).graveyard.contains(imp));
    assert_eq!(game_loop.game.priority.holder(), Side::Opponent);
}

#[test]
fn test_tick_wins_tie_with_due_decision() {
    let mut game = GameState::new_two_player("Alice", "Bob", 20, Side::Player);
    let bear = game
        .add_card(Side::Player, Zone::Hand, &CardTemplate::summon("Bear", 0, 2, 2))
        .unwrap();
    let script = vec![GameAction::CommitResource { card: bear }];
    let slow = ScriptedController::new(Side::Player, script).with_delay(3_000);
    let opponent = ManualController::new(Side::Opponent);
    let mut game_loop = GameLoop::new(game, Box::new(slow), Box::new(opponent))
        .unwrap()
        .with_clock(3, &[])
        .with_verbosity(VerbosityLevel::Silent);

    game_loop.start().unwrap();
    let first = game_loop.pending_decision(Side::Player).unwrap();
    game_loop.advance_to(3_000).unwrap();

    let events = game_loop.take_events();
    assert!(!game_loop.is_decision_pending(first));
    assert_eq!(timeouts(&events), 1);
    assert!(!events
        .iter()
        .any(|e| matches!(e, GameEvent::ActionTaken { side: Side::Player, .. })));
    assert!(game_loop.game.zones(Side::Player).hand.contains(bear));
}

#[test]
fn test_burst_delivery_matches_single_ticks() {
    let mut burst = TurnClock::default();
    let mut single = TurnClock::default();

    let burst_events = burst.tick_many(300);
    let mut single_events = Vec::new();
    for _ in 0..300 {
        single_events.extend(single.tick());
    }

    assert_eq!(burst_events, single_events);
    assert_eq!(burst_events.last(), Some(&ClockEvent::Expired));
    assert_eq!(burst.remaining_secs(), 0);
    assert!(burst.tick_many(50).is_empty());
}

proptest! {
    #[test]
    fn clock_reports_each_threshold_and_expiry_at_most_once(
        budget in 1u32..400,
        thresholds in prop::collection::btree_set(1u32..400, 0..5),
        ticks in 0u32..800,
    ) {
        let list: Vec<u32> = thresholds.iter().copied().collect();
        let mut clock = TurnClock::new(budget, &list);
        let events = clock.tick_many(ticks);

        let expired = events.iter().filter(|e| **e == ClockEvent::Expired).count();
        prop_assert_eq!(expired, usize::from(ticks >= budget));
        prop_assert_eq!(clock.is_expired(), ticks >= budget);
        prop_assert_eq!(clock.remaining_secs(), budget.saturating_sub(ticks));

        let fired: BTreeSet<u32> = events
            .iter()
            .filter_map(|e| match e {
                ClockEvent::Warning { seconds_remaining } => Some(*seconds_remaining),
                ClockEvent::Expired => None,
            })
            .collect();
        let warning_count = events.len() - expired;
        prop_assert_eq!(fired.len(), warning_count);

        let expected: BTreeSet<u32> = thresholds
            .iter()
            .copied()
            .filter(|t| *t < budget && ticks >= budget - t)
            .collect();
        prop_assert_eq!(fired, expected);
    }

    #[test]
    fn reset_restores_full_budget(budget in 1u32..200, ticks in 0u32..300) {
        let mut clock = TurnClock::new(budget, &[10]);
        clock.tick_many(ticks);
        clock.reset();
        prop_assert_eq!(clock.remaining_secs(), budget);
        prop_assert!(!clock.is_expired());

        let again = clock.tick_many(budget);
        prop_assert_eq!(again.iter().filter(|e| **e == ClockEvent::Expired).count(), 1);
    }
}
