use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::difficulty::Difficulty;

/// Command rejected by the game controller.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum GameError {
    /// The difficulty cannot change under an active run. The caller must
    /// confirm with the player and start a new game itself.
    #[error("changing difficulty from {current} to {requested} requires starting a new game")]
    DifficultyChangeRequiresConfirmation {
        current: Difficulty,
        requested: Difficulty,
    },
}

/// Failure while persisting the leaderboard.
///
/// In-memory leaderboard state stays valid after any of these.
#[derive(Debug, Error)]
pub enum LeaderboardError {
    #[error("failed to write leaderboard to {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode leaderboard: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure while loading optional configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
