use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Game speed setting; also partitions the leaderboard.
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
pub enum Difficulty {
    Slow,
    #[default]
    Medium,
    Fast,
}

impl Difficulty {
    /// Every difficulty, slowest first.
    pub const ALL: [Self; 3] = [Self::Slow, Self::Medium, Self::Fast];

    /// Fixed tick period in milliseconds.
    #[must_use]
    pub fn tick_interval_ms(self) -> u64 {
        match self {
            Self::Slow => 150,
            Self::Medium => 100,
            Self::Fast => 50,
        }
    }

    /// Fixed tick period the external scheduler should use.
    #[must_use]
    pub fn tick_interval(self) -> Duration {
        Duration::from_millis(self.tick_interval_ms())
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Medium => "Medium",
            Self::Fast => "Fast",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a difficulty name is not recognised.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
#[error("unknown difficulty `{0}` (expected slow, medium or fast)")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "slow" => Ok(Self::Slow),
            "medium" => Ok(Self::Medium),
            "fast" => Ok(Self::Fast),
            _ => Err(ParseDifficultyError(raw.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::Difficulty;

    #[test]
    fn faster_difficulties_tick_more_often() {
        assert_eq!(Difficulty::Slow.tick_interval(), Duration::from_millis(150));
        assert_eq!(Difficulty::Medium.tick_interval(), Duration::from_millis(100));
        assert_eq!(Difficulty::Fast.tick_interval(), Duration::from_millis(50));
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("FAST".parse::<Difficulty>(), Ok(Difficulty::Fast));
        assert_eq!(" slow ".parse::<Difficulty>(), Ok(Difficulty::Slow));
        assert!("ludicrous".parse::<Difficulty>().is_err());
    }

    #[test]
    fn default_is_medium() {
        assert_eq!(Difficulty::default(), Difficulty::Medium);
        assert_eq!(Difficulty::default().to_string(), "Medium");
    }
}
