use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mexicano::config::{AppConfig, Format, TournamentConfig};
use mexicano::models::{Roster, Round, WinnerSide};
use mexicano::pairing::{streak, NextRound};
use mexicano::session::{TournamentInfo, TournamentSession};
use mexicano::storage::{SessionStore, StorageConfig};

#[derive(Parser)]
#[command(name = "mexicano")]
#[command(about = "Round pairing for casual doubles sessions")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a tournament
    New {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        place: String,

        /// Player names, comma-separated, in roster order
        #[arg(long, value_delimiter = ',', required = true)]
        players: Vec<String>,

        /// Pairing format (generic, winner_stay_6p1c)
        #[arg(long)]
        format: Option<Format>,

        #[arg(long)]
        courts: Option<u32>,

        /// Maximum back-to-back rounds before a forced rest
        #[arg(long)]
        cap: Option<u32>,

        #[arg(long)]
        max_retries: Option<u32>,

        #[arg(long)]
        point_limit: Option<u32>,
    },

    /// Generate the next pending round
    Draw {
        #[arg(long)]
        tournament: String,

        /// RNG seed for a reproducible draw
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Replace the pending round with a fresh draw
    Redraw {
        #[arg(long)]
        tournament: String,

        #[arg(long)]
        seed: Option<u64>,
    },

    /// Lock the pending round so it can be played
    Start {
        #[arg(long)]
        tournament: String,
    },

    /// Record the result of a started round
    Result {
        #[arg(long)]
        tournament: String,

        #[arg(long)]
        round: u32,

        /// Winning side: a, b or tie
        #[arg(long)]
        winner: WinnerSide,

        #[arg(long)]
        score_a: u32,

        #[arg(long)]
        score_b: u32,
    },

    /// Reopen a completed round to correct its result
    Revise {
        #[arg(long)]
        tournament: String,

        #[arg(long)]
        round: u32,
    },

    /// Print roster, played rounds and the pending round
    Show {
        #[arg(long)]
        tournament: String,
    },

    /// List stored tournaments
    List,

    /// Play an in-memory tournament with random results
    Simulate {
        #[arg(long, default_value = "6")]
        players: usize,

        #[arg(long)]
        format: Option<Format>,

        #[arg(long, default_value = "12")]
        rounds: u32,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

fn print_round(roster: &Roster, round: &Round) {
    let team = |t: &mexicano::models::Team| {
        format!(
            "{} & {}",
            roster.display_name(t.first()),
            roster.display_name(t.second())
        )
    };
    let bench: Vec<String> = round.bench.iter().map(|p| roster.display_name(p)).collect();

    println!(
        "Round {} [{}]: {} vs {}",
        round.number,
        round.status,
        team(&round.team_a),
        team(&round.team_b)
    );
    if !bench.is_empty() {
        println!("  bench: {}", bench.join(", "));
    }
    if let Some(outcome) = &round.outcome {
        println!(
            "  result: {} ({}-{})",
            outcome.winner, outcome.score_a, outcome.score_b
        );
    }
}

fn print_next(roster: &Roster, next: &NextRound) {
    match next {
        NextRound::Ready(draft) => {
            print_round(roster, &draft.round);
            println!("  strategy: {}", draft.strategy);
            if let Some(degradation) = &draft.degradation {
                println!("  note: {}", degradation);
            }
        }
        NextRound::Blocked(blocked) => println!("{}", blocked),
    }
}

fn simulate(
    players: usize,
    config: TournamentConfig,
    rounds: u32,
    rng: &mut StdRng,
) -> Result<()> {
    let names: Vec<String> = (1..=players).map(|i| format!("Player {}", i)).collect();
    let info = TournamentInfo::new("Simulation", "memory");
    let mut session = TournamentSession::new(info, &names, config)?;
    let limit = session.config().point_limit;

    for _ in 0..rounds {
        let next = session.draw(rng)?;
        print_next(&session.roster, &next);
        if next.is_blocked() {
            bail!("simulation blocked: {:?}", next);
        }

        let number = session.start()?.number;
        let loser_score = rng.gen_range(0..limit);
        let (winner, score_a, score_b) = if rng.gen_bool(0.5) {
            (WinnerSide::A, limit, loser_score)
        } else {
            (WinnerSide::B, loser_score, limit)
        };
        session.record_outcome(number, winner, score_a, score_b)?;
    }

    let longest = streak::longest_streak(session.history().rounds());
    println!(
        "Played {} rounds; longest consecutive run: {} (cap {})",
        session.history().len(),
        longest,
        session.config().consecutive_cap
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut app_config = AppConfig::load_or_default(&PathBuf::from(&cli.config))
        .with_context(|| format!("Failed to load config from {}", cli.config))?;
    if let Some(dir) = &cli.data_dir {
        app_config.data_dir = PathBuf::from(dir);
    }
    if let Some(level) = &cli.log_level {
        app_config.log_level = level.clone();
    }

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&app_config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!("Starting mexicano v{}", env!("CARGO_PKG_VERSION"));

    let store = SessionStore::new(StorageConfig::new(app_config.data_dir.clone()));

    match cli.command {
        Commands::New {
            name,
            place,
            players,
            format,
            courts,
            cap,
            max_retries,
            point_limit,
        } => {
            let defaults = app_config.tournament.clone();
            let config = TournamentConfig {
                format: format.unwrap_or(defaults.format),
                court_count: courts.unwrap_or(defaults.court_count),
                consecutive_cap: cap.unwrap_or(defaults.consecutive_cap),
                max_retries: max_retries.unwrap_or(defaults.max_retries),
                point_limit: point_limit.unwrap_or(defaults.point_limit),
                ..defaults
            };

            let info = TournamentInfo::new(&name, &place);
            let session = TournamentSession::new(info, &players, config)?;
            if store.exists(session.info.id.as_str()) {
                bail!("Tournament {} already exists", session.info.id);
            }
            store.save(&session)?;

            println!("Created tournament {} ({})", session.info.id, session.info.name);
            for player in session.roster.players() {
                println!("  {}  {}", player.code, player.name);
            }
        }

        Commands::Draw { tournament, seed } => {
            let mut session = store.load(&tournament)?;
            let next = session.draw(&mut make_rng(seed))?;
            store.save(&session)?;
            print_next(&session.roster, &next);
        }

        Commands::Redraw { tournament, seed } => {
            let mut session = store.load(&tournament)?;
            let next = session.redraw(&mut make_rng(seed))?;
            store.save(&session)?;
            print_next(&session.roster, &next);
        }

        Commands::Start { tournament } => {
            let mut session = store.load(&tournament)?;
            let round = session.start()?.clone();
            store.save(&session)?;
            print_round(&session.roster, &round);
        }

        Commands::Result {
            tournament,
            round,
            winner,
            score_a,
            score_b,
        } => {
            let mut session = store.load(&tournament)?;
            let updated = session
                .record_outcome(round, winner, score_a, score_b)?
                .clone();
            store.save(&session)?;
            print_round(&session.roster, &updated);
        }

        Commands::Revise { tournament, round } => {
            let mut session = store.load(&tournament)?;
            let reopened = session.revise(round)?.clone();
            store.save(&session)?;
            print_round(&session.roster, &reopened);
        }

        Commands::Show { tournament } => {
            let session = store.load(&tournament)?;
            let config = session.config();

            println!(
                "{} @ {} ({})",
                session.info.name, session.info.place, session.info.id
            );
            println!(
                "Format: {}, {} players, {} court(s), cap {}",
                config.format, config.player_count, config.court_count, config.consecutive_cap
            );
            for player in session.roster.players() {
                println!("  {}  {}", player.code, player.name);
            }
            for round in session.history().rounds() {
                print_round(&session.roster, round);
            }
            if let Some(pending) = session.pending() {
                print_round(&session.roster, pending);
            }
        }

        Commands::List => {
            let ids = store.list()?;
            if ids.is_empty() {
                println!("No tournaments in {}", app_config.data_dir.display());
            }
            for id in ids {
                let session = store.load(&id)?;
                println!(
                    "{}  {} ({} rounds)",
                    id,
                    session.info.name,
                    session.history().len()
                );
            }
        }

        Commands::Simulate {
            players,
            format,
            rounds,
            seed,
        } => {
            let config = TournamentConfig {
                format: format.unwrap_or(app_config.tournament.format),
                ..app_config.tournament.clone()
            };
            simulate(players, config, rounds, &mut make_rng(seed))?;
        }
    }

    Ok(())
}
