use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Canonical movement directions for snake input.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Returns the `(dx, dy)` unit step for one cell of movement.
    #[must_use]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Left => "Left",
            Self::Right => "Right",
        };
        f.write_str(name)
    }
}

/// Returns whether a direction change is legal (no immediate 180° turns).
#[must_use]
pub fn direction_change_is_valid(current: Direction, next: Direction) -> bool {
    next != current.opposite()
}

/// Translates raw key symbols into logical directions.
///
/// This is the only place key symbols exist; the engine itself only ever
/// sees [`Direction`] values.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyMap {
    bindings: HashMap<String, Direction>,
}

impl KeyMap {
    /// Creates an empty key map.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Loads bindings from a JSON object of `{ "symbol": "Direction" }`.
    ///
    /// The file replaces the default bindings rather than extending them.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Binds `symbol` to `direction`, replacing any previous binding.
    pub fn bind(&mut self, symbol: impl Into<String>, direction: Direction) {
        self.bindings.insert(symbol.into(), direction);
    }

    /// Resolves a key symbol, returning `None` for unbound keys.
    #[must_use]
    pub fn resolve(&self, symbol: &str) -> Option<Direction> {
        self.bindings.get(symbol).copied()
    }

    /// Returns the number of bound symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns true when nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for KeyMap {
    /// Arrow key symbols plus the ESDF cluster.
    fn default() -> Self {
        let mut map = Self::empty();
        for direction in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            map.bind(direction.to_string(), direction);
        }
        map.bind("e", Direction::Up);
        map.bind("d", Direction::Down);
        map.bind("s", Direction::Left);
        map.bind("f", Direction::Right);
        map
    }
}
