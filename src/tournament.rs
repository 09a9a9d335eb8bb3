//! Tournament mode for running AI-vs-AI games in parallel and collecting statistics
//!
//! Every ordered pair of distinct tiers plays `games_per_pairing` games on
//! simulated time. Games are spread across threads with rayon; each game is
//! seeded from the tournament seed and its index, so a tournament is
//! reproducible regardless of scheduling.

use crate::config::MatchConfig;
use crate::core::Side;
use crate::game::{
    DeckList, Difficulty, GameInitializer, GameLoop, HeuristicController, VerbosityLevel,
};
use crate::{EngineError, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct TourneyConfig {
    pub tiers: Vec<Difficulty>,
    pub games_per_pairing: usize,
    pub seed: u64,
    pub match_config: MatchConfig,
    pub deck: DeckList,
}

impl TourneyConfig {
    pub fn new(tiers: Vec<Difficulty>, games_per_pairing: usize, seed: u64) -> Self {
        TourneyConfig {
            tiers,
            games_per_pairing,
            seed,
            match_config: MatchConfig::default(),
            deck: DeckList::starter(),
        }
    }
}

/// Results for one tier pairing (first tier sits in the player seat)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PairingStats {
    pub first_wins: usize,
    pub second_wins: usize,
    pub draws: usize,
    pub total_turns: u64,
    pub failed: usize,
}

impl PairingStats {
    pub fn games(&self) -> usize {
        self.first_wins + self.second_wins + self.draws
    }

    pub fn mean_turns(&self) -> f64 {
        match self.games() {
            0 => 0.0,
            n => self.total_turns as f64 / n as f64,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TourneyReport {
    pub pairings: BTreeMap<(Difficulty, Difficulty), PairingStats>,
    /// Wins per tier across both seats
    pub tier_wins: BTreeMap<Difficulty, usize>,
    pub tier_games: BTreeMap<Difficulty, usize>,
    pub elapsed_secs: f64,
}

impl TourneyReport {
    pub fn total_games(&self) -> usize {
        self.pairings.values().map(PairingStats::games).sum()
    }

    pub fn print(&self) {
        println!("\n=== Tournament Complete ===");
        println!("Total games played: {}", self.total_games());
        println!("Elapsed time: {:.2}s\n", self.elapsed_secs);

        println!("=== Tier Win Rates ===");
        for (tier, games) in &self.tier_games {
            let wins = self.tier_wins.get(tier).copied().unwrap_or(0);
            if *games > 0 {
                println!(
                    "  {tier}: {wins}/{games} ({:.1}%)",
                    100.0 * wins as f64 / *games as f64
                );
            }
        }

        println!("\n=== Pairing Results ===");
        for ((first, second), stats) in &self.pairings {
            println!(
                "  {first} vs {second}: {} games, {}-{}-{} (mean {:.1} turns)",
                stats.games(),
                stats.first_wins,
                stats.second_wins,
                stats.draws,
                stats.mean_turns()
            );
            if stats.failed > 0 {
                println!("    {} games failed", stats.failed);
            }
        }
    }
}

/// Play every pairing and collect statistics
pub fn run_tourney(config: &TourneyConfig) -> Result<TourneyReport> {
    if config.tiers.len() < 2 {
        return Err(EngineError::InvalidConfig(
            "a tournament needs at least 2 tiers".to_string(),
        ));
    }
    if config.games_per_pairing == 0 {
        return Err(EngineError::InvalidConfig("games per pairing must be positive".to_string()));
    }
    config.match_config.validate()?;

    let mut schedule = Vec::new();
    for &first in &config.tiers {
        for &second in &config.tiers {
            if first != second {
                for _ in 0..config.games_per_pairing {
                    schedule.push((first, second));
                }
            }
        }
    }

    let start = Instant::now();
    let stats: Mutex<BTreeMap<(Difficulty, Difficulty), PairingStats>> =
        Mutex::new(BTreeMap::new());

    schedule
        .par_iter()
        .enumerate()
        .for_each(|(game_idx, &(first, second))| {
            let game_seed = config
                .seed
                .wrapping_add((game_idx as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
            let outcome = play_one(config, first, second, game_seed);

            // A poisoned lock only means another game panicked mid-update
            let mut stats = stats.lock().unwrap_or_else(|e| e.into_inner());
            let entry = stats.entry((first, second)).or_default();
            match outcome {
                Ok((winner, turns)) => {
                    entry.total_turns += u64::from(turns);
                    match winner {
                        Some(Side::Player) => entry.first_wins += 1,
                        Some(Side::Opponent) => entry.second_wins += 1,
                        None => entry.draws += 1,
                    }
                }
                Err(_) => entry.failed += 1,
            }
        });

    let pairings = stats.into_inner().unwrap_or_else(|e| e.into_inner());
    let mut tier_wins = BTreeMap::new();
    let mut tier_games = BTreeMap::new();
    for ((first, second), s) in &pairings {
        *tier_wins.entry(*first).or_insert(0) += s.first_wins;
        *tier_wins.entry(*second).or_insert(0) += s.second_wins;
        *tier_games.entry(*first).or_insert(0) += s.games();
        *tier_games.entry(*second).or_insert(0) += s.games();
    }

    Ok(TourneyReport {
        pairings,
        tier_wins,
        tier_games,
        elapsed_secs: start.elapsed().as_secs_f64(),
    })
}

fn play_one(
    config: &TourneyConfig,
    first: Difficulty,
    second: Difficulty,
    game_seed: u64,
) -> Result<(Option<Side>, u32)> {
    let match_config = config.match_config.clone().with_seed(game_seed);
    let game = GameInitializer::new(&match_config).init_game(
        first.name(),
        &config.deck,
        second.name(),
        &config.deck,
    )?;

    let p1_seed = game_seed.wrapping_add(0x1234_5678_9ABC_DEF0);
    let p2_seed = game_seed.wrapping_add(0xFEDC_BA98_7654_3210);
    let p1 = HeuristicController::new(Side::Player, first, p1_seed);
    let p2 = HeuristicController::new(Side::Opponent, second, p2_seed);

    let mut game_loop = GameLoop::new(game, Box::new(p1), Box::new(p2))?
        .with_config(&match_config)
        .with_verbosity(VerbosityLevel::Silent);
    let result = game_loop.run_game()?;
    Ok((result.winner, result.turns_played))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_two_tiers() {
        let config = TourneyConfig::new(vec![Difficulty::Easy], 1, 0);
        assert!(run_tourney(&config).is_err());
    }

    #[test]
    fn test_small_tourney_counts_every_game() {
        let mut config = TourneyConfig::new(vec![Difficulty::Beginner, Difficulty::Mythic], 2, 7);
        config.match_config = config.match_config.with_max_turns(30);
        let report = run_tourney(&config).unwrap();

        assert_eq!(report.pairings.len(), 2);
        assert_eq!(report.total_games(), 4);
        assert_eq!(report.tier_games[&Difficulty::Beginner], 4);
        assert!(report.pairings.values().all(|s| s.failed == 0));
    }
}
