use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;

use clap::Parser;
use serde::Serialize;
use snake_engine::config::{GameConfig, GridSize, DEFAULT_GRID_HEIGHT, DEFAULT_GRID_WIDTH};
use snake_engine::game::{GameController, TickOutcome};
use snake_engine::leaderboard::{scores_path, Leaderboard};
use snake_engine::{Difficulty, KeyMap};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Headless scheduler: reads commands and key symbols from stdin and prints
/// one JSON snapshot per command on stdout.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Tick speed and leaderboard table.
    #[arg(long, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,

    /// Seed for reproducible food placement.
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_GRID_WIDTH)]
    width: u16,

    #[arg(long, default_value_t = DEFAULT_GRID_HEIGHT)]
    height: u16,

    /// Leaderboard file (defaults to the platform data directory).
    #[arg(long)]
    scores: Option<PathBuf>,

    /// Keep the leaderboard in memory only.
    #[arg(long = "no-save", conflicts_with = "scores")]
    no_save: bool,

    /// JSON object mapping key symbols to directions.
    #[arg(long)]
    keymap: Option<PathBuf>,

    /// Player name recorded automatically when a game ends.
    #[arg(long)]
    name: Option<String>,

    /// Sleep one tick period between ticks instead of running them back to back.
    #[arg(long)]
    realtime: bool,
}

/// One line of driver input.
#[derive(Debug, Clone, Eq, PartialEq)]
enum Command {
    Start,
    Reset,
    Pause,
    Tick(u32),
    SetDifficulty(Difficulty),
    Record(String),
    Scores,
    Quit,
    Key(String),
}

fn parse_command(line: &str) -> Option<Command> {
    let mut words = line.split_whitespace();
    let head = words.next()?;
    let rest = words.collect::<Vec<_>>().join(" ");

    let command = match head {
        "start" | "n" => Command::Start,
        "reset" => Command::Reset,
        "pause" | "space" => Command::Pause,
        "tick" if rest.is_empty() => Command::Tick(1),
        "tick" => Command::Tick(rest.parse().ok()?),
        "difficulty" => Command::SetDifficulty(rest.parse().ok()?),
        "record" => Command::Record(rest),
        "scores" => Command::Scores,
        "quit" | "exit" => Command::Quit,
        symbol => Command::Key(symbol.to_owned()),
    };
    Some(command)
}

fn main() -> io::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let keys = match &cli.keymap {
        Some(path) => KeyMap::from_json_file(path).map_err(io::Error::other)?,
        None => KeyMap::default(),
    };

    let leaderboard = if cli.no_save {
        Leaderboard::in_memory()
    } else {
        Leaderboard::load(cli.scores.clone().unwrap_or_else(scores_path))
    };

    let config = GameConfig::with_grid(GridSize {
        width: cli.width,
        height: cli.height,
    });
    let mut game = match cli.seed {
        Some(seed) => GameController::with_seed(config, leaderboard, seed),
        None => GameController::new(config, leaderboard),
    };
    if let Err(error) = game.set_difficulty(cli.difficulty) {
        warn!(%error, "difficulty not applied");
    }

    run(&cli, &keys, &mut game)
}

fn run(cli: &Cli, keys: &KeyMap, game: &mut GameController) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();

    for line in stdin.lock().lines() {
        let line = line?;
        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            Command::Quit => break,
            Command::Scores => {
                emit(&mut stdout, game.leaderboard().entries(game.difficulty()))?;
                continue;
            }
            other => apply(cli, keys, game, other),
        }

        emit(&mut stdout, &game.snapshot())?;
    }

    Ok(())
}

fn apply(cli: &Cli, keys: &KeyMap, game: &mut GameController, command: Command) {
    match command {
        Command::Start => game.start_new_game(),
        Command::Reset => game.reset(),
        Command::Pause => {
            game.toggle_pause();
        }
        Command::Tick(count) => {
            for _ in 0..count {
                if cli.realtime {
                    thread::sleep(game.difficulty().tick_interval());
                }
                if let TickOutcome::GameOver(reason) = game.tick() {
                    info!(?reason, "run finished");
                    if let Some(name) = &cli.name {
                        record(game, name);
                    }
                    break;
                }
            }
        }
        Command::SetDifficulty(difficulty) => {
            if let Err(error) = game.set_difficulty(difficulty) {
                warn!(%error, "difficulty unchanged; send `reset` or `start` first");
            }
        }
        Command::Record(name) => record(game, &name),
        Command::Key(symbol) => match keys.resolve(&symbol) {
            Some(direction) => {
                game.enqueue_direction(direction);
            }
            None => warn!(%symbol, "unbound key"),
        },
        Command::Scores | Command::Quit => {}
    }
}

fn record(game: &mut GameController, name: &str) {
    match game.record_score_if_qualified(Some(name)) {
        Ok(Some(rank)) => info!(rank = rank + 1, player = name, "new top score"),
        Ok(None) => {}
        Err(error) => error!(%error, "failed to save leaderboard"),
    }
}

fn emit<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value).map_err(io::Error::other)?;
    writeln!(out)?;
    out.flush()
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snake_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
