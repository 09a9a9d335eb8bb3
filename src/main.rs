//! Azoth - Main Binary
//!
//! Runs AI-vs-AI matches, prints decision profiles, and runs tier tournaments

use azoth_rules::{
    config::MatchConfig,
    core::Side,
    game::{
        DeckList, DecisionParameterProfile, Difficulty, GameInitializer, GameLoop,
        HeuristicController, OutputFormat, VerbosityLevel,
    },
    runtime::MatchHandle,
    tournament::{run_tourney, TourneyConfig},
    EngineError, Result,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Verbosity level for game output (custom parser supporting both names and numbers)
#[derive(Debug, Clone, Copy)]
struct VerbosityArg(VerbosityLevel);

impl std::str::FromStr for VerbosityArg {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityArg(VerbosityLevel::Silent)),
            "minimal" | "1" => Ok(VerbosityArg(VerbosityLevel::Minimal)),
            "normal" | "2" => Ok(VerbosityArg(VerbosityLevel::Normal)),
            "verbose" | "3" => Ok(VerbosityArg(VerbosityLevel::Verbose)),
            _ => Err(format!(
                "invalid verbosity level '{s}' (expected: silent/0, minimal/1, normal/2, verbose/3)"
            )),
        }
    }
}

impl From<VerbosityArg> for VerbosityLevel {
    fn from(arg: VerbosityArg) -> Self {
        arg.0
    }
}

#[derive(Parser)]
#[command(name = "azoth")]
#[command(about = "Azoth - turn, priority and AI rules engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one AI-vs-AI match
    Play {
        /// Difficulty of the player seat
        #[arg(long, default_value = "normal")]
        player: Difficulty,

        /// Difficulty of the opponent seat
        #[arg(long, default_value = "normal")]
        opponent: Difficulty,

        /// Set random seed for deterministic testing
        #[arg(long)]
        seed: Option<u64>,

        /// Match configuration file (JSON)
        #[arg(long, value_name = "CONFIG_FILE")]
        config: Option<PathBuf>,

        /// Deck list (JSON) used by both seats; defaults to the starter deck
        #[arg(long, value_name = "DECK_FILE")]
        deck: Option<PathBuf>,

        /// Override the configured turn limit
        #[arg(long)]
        max_turns: Option<u32>,

        /// Verbosity level for game output (0=silent, 1=minimal, 2=normal, 3=verbose)
        #[arg(long, default_value = "normal", short = 'v')]
        verbosity: VerbosityArg,

        /// Print log lines as JSON objects
        #[arg(long)]
        json: bool,

        /// Run on the wall clock with real thinking delays
        #[arg(long)]
        realtime: bool,
    },

    /// Print a generated decision profile as JSON
    Profile {
        #[arg(long, default_value = "normal")]
        difficulty: Difficulty,

        #[arg(long, default_value_t = 0)]
        seed: u64,
    },

    /// Round robin between difficulty tiers, run in parallel
    Tourney {
        /// Games per ordered tier pairing
        #[arg(long, short = 'g', default_value_t = 10)]
        games: usize,

        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Comma separated tiers (default: all six)
        #[arg(long, value_delimiter = ',')]
        tiers: Vec<Difficulty>,

        /// Override the default turn limit
        #[arg(long)]
        max_turns: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            player,
            opponent,
            seed,
            config,
            deck,
            max_turns,
            verbosity,
            json,
            realtime,
        } => {
            run_play(
                player,
                opponent,
                seed,
                config,
                deck,
                max_turns,
                verbosity.into(),
                json,
                realtime,
            )
            .await?
        }
        Commands::Profile { difficulty, seed } => {
            let profile = DecisionParameterProfile::generate(difficulty, seed);
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }
        Commands::Tourney {
            games,
            seed,
            tiers,
            max_turns,
        } => {
            let tiers = if tiers.is_empty() {
                Difficulty::ALL.to_vec()
            } else {
                tiers
            };
            println!("=== Azoth - Tournament Mode ===\n");
            println!("Tiers: {}", tiers.iter().map(|t| t.name()).collect::<Vec<_>>().join(", "));
            println!("Running {games} games per pairing (seed {seed})");

            let mut config = TourneyConfig::new(tiers, games, seed);
            if let Some(max_turns) = max_turns {
                config.match_config = config.match_config.with_max_turns(max_turns);
            }
            run_tourney(&config)?.print();
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_play(
    player: Difficulty,
    opponent: Difficulty,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
    deck_path: Option<PathBuf>,
    max_turns: Option<u32>,
    verbosity: VerbosityLevel,
    json: bool,
    realtime: bool,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => MatchConfig::load(path)?,
        None => MatchConfig::default(),
    };
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    if let Some(max_turns) = max_turns {
        config = config.with_max_turns(max_turns);
    }
    config.validate()?;

    let deck = match deck_path {
        Some(path) => DeckList::load_from_file(path)?,
        None => DeckList::starter(),
    };

    let mut game = GameInitializer::new(&config).init_game(
        player.name(),
        &deck,
        opponent.name(),
        &deck,
    )?;
    if json {
        game.logger.set_output_format(OutputFormat::Json);
    }

    let multiplier = config.thinking_time_multiplier;
    let p1 = HeuristicController::new(Side::Player, player, config.seed.wrapping_add(1))
        .with_thinking_time_multiplier(multiplier);
    let p2 = HeuristicController::new(Side::Opponent, opponent, config.seed.wrapping_add(2))
        .with_thinking_time_multiplier(multiplier);

    let game_loop = GameLoop::new(game, Box::new(p1), Box::new(p2))?
        .with_config(&config)
        .with_verbosity(verbosity);

    let result = if realtime {
        let (handle, mut events) = MatchHandle::spawn(game_loop);
        // Drain so the channel does not grow; the logger already printed them
        tokio::spawn(async move { while events.recv().await.is_some() {} });
        handle.join().await?
    } else {
        let mut game_loop = game_loop;
        Some(game_loop.run_game()?)
    };

    let result = result.ok_or(EngineError::ChannelClosed)?;
    if verbosity > VerbosityLevel::Silent && !json {
        let winner = result
            .winner
            .map_or_else(|| "nobody (draw)".to_string(), |side| side.to_string());
        println!(
            "\nWinner: {winner} after {} turns ({:?}, {:.1}s of match time)",
            result.turns_played,
            result.end_reason,
            result.elapsed_ms as f64 / 1000.0
        );
    }
    Ok(())
}
