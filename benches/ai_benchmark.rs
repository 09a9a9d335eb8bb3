//! Performance benchmarks for the rules engine and heuristic AI
//!
//! - **fresh**: initialize and play a whole AI-vs-AI match per iteration
//! - **snapshot**: clone a pre-dealt game state and play it out
//! - **decide**: one heuristic decision in a busy main phase
//! - **profile**: decision profile generation

use azoth_rules::{
    config::MatchConfig,
    core::Side,
    game::{
        CardTemplate, DecisionParameterProfile, DeckList, Difficulty, GameInitializer, GameLoop,
        GameState, GameStateView, HeuristicController, Phase, VerbosityLevel,
    },
    zones::Zone,
    Result,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::time::{Duration, Instant};

/// Metrics collected during one match
#[derive(Debug, Clone)]
struct GameMetrics {
    turns: u32,
    events: usize,
    duration: Duration,
    /// Virtual match time
    match_ms: u64,
}

impl GameMetrics {
    fn events_per_sec(&self) -> f64 {
        self.events as f64 / self.duration.as_secs_f64()
    }

    fn events_per_turn(&self) -> f64 {
        if self.turns == 0 {
            0.0
        } else {
            self.events as f64 / self.turns as f64
        }
    }
}

fn play_out(game: GameState, config: &MatchConfig, seed: u64) -> Result<GameMetrics> {
    let start = Instant::now();
    let p1 = HeuristicController::new(Side::Player, Difficulty::Expert, seed);
    let p2 = HeuristicController::new(Side::Opponent, Difficulty::Normal, seed + 1);
    let mut game_loop = GameLoop::new(game, Box::new(p1), Box::new(p2))?
        .with_config(config)
        .with_verbosity(VerbosityLevel::Silent);
    let result = game_loop.run_game()?;

    Ok(GameMetrics {
        turns: result.turns_played,
        events: game_loop.take_events().len(),
        duration: start.elapsed(),
        match_ms: result.elapsed_ms,
    })
}

fn run_fresh(config: &MatchConfig, deck: &DeckList, seed: u64) -> Result<GameMetrics> {
    let config = config.clone().with_seed(seed);
    let game = GameInitializer::new(&config).init_game("Player 1", deck, "Player 2", deck)?;
    play_out(game, &config, seed)
}

fn bench_game_fresh(c: &mut Criterion) {
    let config = MatchConfig::default();
    let deck = DeckList::starter();

    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);

    let seed = 42u64;
    println!("\nWarmup game (seed {seed}):");
    if let Ok(metrics) = run_fresh(&config, &deck, seed) {
        println!("  Turns: {}", metrics.turns);
        println!("  Events: {}", metrics.events);
        println!("  Duration: {:?}", metrics.duration);
        println!("  Match time: {:.1}s", metrics.match_ms as f64 / 1000.0);
        println!("  Events/sec: {:.2}", metrics.events_per_sec());
        println!("  Events/turn: {:.2}", metrics.events_per_turn());
    }

    group.bench_with_input(BenchmarkId::new("fresh", seed), &seed, |b, &seed| {
        b.iter(|| run_fresh(&config, &deck, black_box(seed)).expect("game should complete"));
    });
    group.finish();
}

fn bench_game_snapshot(c: &mut Criterion) {
    let seed = 42u64;
    let config = MatchConfig::default().with_seed(seed);
    let deck = DeckList::starter();
    let initial = GameInitializer::new(&config)
        .init_game("Player 1", &deck, "Player 2", &deck)
        .expect("starter deck should deal");

    let mut group = c.benchmark_group("game_execution");
    group.sample_size(20);
    group.bench_function(BenchmarkId::new("snapshot", seed), |b| {
        b.iter(|| {
            play_out(initial.clone(), &config, black_box(seed)).expect("game should complete")
        });
    });
    group.finish();
}

fn busy_main_phase() -> GameState {
    let mut game = GameState::new_two_player("Player 1", "Player 2", 20, Side::Player);
    game.logger.set_verbosity(VerbosityLevel::Silent);
    game.turn.phase = Phase::Main1;
    game.priority.grant(Side::Player);

    for i in 0..6 {
        let land = CardTemplate::summon("Land", 0, 0, 1);
        game.add_card(Side::Player, Zone::ResourceRow, &land).expect("resource");
        let creature = CardTemplate::summon(format!("Beast {i}"), i, i as i8 + 1, 3);
        game.add_card(Side::Player, Zone::Hand, &creature).expect("hand");
        game.add_card(Side::Opponent, Zone::Field, &creature).expect("field");
    }
    let bolt = CardTemplate::effect("Bolt", 2).targeted();
    game.add_card(Side::Player, Zone::Hand, &bolt).expect("hand");
    game
}

fn bench_decide(c: &mut Criterion) {
    let game = busy_main_phase();
    let mut group = c.benchmark_group("heuristic");
    for difficulty in [Difficulty::Beginner, Difficulty::Mythic] {
        let mut ai = HeuristicController::new(Side::Player, difficulty, 7);
        group.bench_function(BenchmarkId::new("decide", difficulty), |b| {
            b.iter(|| {
                let view = GameStateView::new(&game, Side::Player);
                black_box(ai.decide(Some(&view)))
            });
        });
    }
    group.finish();
}

fn bench_profile_generation(c: &mut Criterion) {
    c.bench_function("profile_generate", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed = seed.wrapping_add(1);
            DecisionParameterProfile::generate(black_box(Difficulty::Hard), seed)
        });
    });
}

criterion_group!(
    benches,
    bench_game_fresh,
    bench_game_snapshot,
    bench_decide,
    bench_profile_generation
);
criterion_main!(benches);
