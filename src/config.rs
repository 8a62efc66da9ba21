use serde::{Deserialize, Serialize};

use crate::input::Direction;
use crate::snake::Position;

/// Logical grid dimensions passed through the engine as a named type.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u16,
    pub height: u16,
}

impl GridSize {
    /// Returns the total number of cells in the grid.
    #[must_use]
    pub fn total_cells(self) -> usize {
        usize::from(self.width) * usize::from(self.height)
    }
}

/// Default board width in cells (an 800 px canvas split into 20 px cells).
pub const DEFAULT_GRID_WIDTH: u16 = 40;

/// Default board height in cells.
pub const DEFAULT_GRID_HEIGHT: u16 = 40;

/// Cell the snake head occupies when a new game starts.
pub const DEFAULT_START_CELL: Position = Position { x: 1, y: 1 };

/// Heading of a freshly started snake.
pub const DEFAULT_START_DIRECTION: Direction = Direction::Right;

/// Records kept per difficulty.
pub const LEADERBOARD_CAPACITY: usize = 10;

/// Upper bound on direction changes buffered between two ticks.
pub const MAX_QUEUED_DIRECTIONS: usize = 16;

/// Directory under the platform data dir holding persisted state.
pub const APP_DIR_NAME: &str = "snake-engine";

/// Leaderboard file name inside [`APP_DIR_NAME`].
pub const SCORE_FILE_NAME: &str = "top_scores.json";

/// Per-session engine configuration.
///
/// Board geometry is an input to the engine, never engine state: every new
/// game is laid out from this value.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct GameConfig {
    pub grid: GridSize,
    pub start: Position,
    pub start_direction: Direction,
}

impl GameConfig {
    /// Builds a config for a custom grid, keeping the default start cell when
    /// it fits and falling back to the top-left corner otherwise.
    #[must_use]
    pub fn with_grid(grid: GridSize) -> Self {
        let start = if DEFAULT_START_CELL.is_within_bounds(grid) {
            DEFAULT_START_CELL
        } else {
            Position { x: 0, y: 0 }
        };

        Self {
            grid,
            start,
            start_direction: DEFAULT_START_DIRECTION,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::with_grid(GridSize {
            width: DEFAULT_GRID_WIDTH,
            height: DEFAULT_GRID_HEIGHT,
        })
    }
}
