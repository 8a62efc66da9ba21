//! Deterministic game-state engine for grid Snake.
//!
//! The engine owns the simulation only: an external scheduler calls
//! [`game::GameController::tick`] at the period given by
//! [`difficulty::Difficulty::tick_interval`], input layers translate key
//! symbols through [`input::KeyMap`], and renderers read
//! [`game::GameSnapshot`] values.

pub mod board;
pub mod clock;
pub mod collision;
pub mod config;
pub mod difficulty;
pub mod direction_queue;
pub mod error;
pub mod food;
pub mod game;
pub mod input;
pub mod leaderboard;
pub mod snake;

pub use difficulty::Difficulty;
pub use error::{ConfigError, GameError, LeaderboardError};
pub use game::{GameController, GameSnapshot, RunPhase, TickOutcome};
pub use input::{Direction, KeyMap};
pub use leaderboard::{Leaderboard, ScoreRecord};
