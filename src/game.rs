use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use crate::board::Board;
use crate::clock::{format_elapsed, GameClock, MonotonicTime, TimeSource};
use crate::collision::{self, Collision};
use crate::config::GameConfig;
use crate::difficulty::Difficulty;
use crate::direction_queue::DirectionQueue;
use crate::error::{GameError, LeaderboardError};
use crate::food::spawn_food;
use crate::input::Direction;
use crate::leaderboard::{Leaderboard, ScoreRecord};
use crate::snake::{Position, Snake};

/// Controller state machine phase.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum RunPhase {
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum EndReason {
    Collision(Collision),
    /// The snake covers every cell, leaving nowhere to place food.
    BoardFilled,
}

/// What a single call to [`GameController::tick`] did.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TickOutcome {
    /// Not running; nothing moved.
    Skipped,
    Moved,
    AteFood,
    GameOver(EndReason),
}

/// Outcome of a finished run, held until the caller decides on a name.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct FinalResult {
    pub difficulty: Difficulty,
    pub score: u32,
    pub duration: Duration,
}

/// Per-session mutable state. A new game always builds a fresh one.
#[derive(Debug, Clone)]
pub struct GameState {
    pub snake: Snake,
    pub food: Option<Position>,
    pub phase: RunPhase,
    pub end_reason: Option<EndReason>,
    pub tick_count: u64,
    queue: DirectionQueue,
    clock: GameClock,
}

impl GameState {
    fn idle(config: &GameConfig) -> Self {
        Self {
            snake: Snake::new(config.start, config.start_direction),
            food: None,
            phase: RunPhase::Idle,
            end_reason: None,
            tick_count: 0,
            queue: DirectionQueue::new(),
            clock: GameClock::new(),
        }
    }

    /// Score is the snake's length; there is no separate counter.
    #[must_use]
    pub fn score(&self) -> u32 {
        u32::try_from(self.snake.len()).unwrap_or(u32::MAX)
    }

    /// Returns the direction the next tick will move in.
    #[must_use]
    pub fn effective_direction(&self) -> Direction {
        self.queue.effective(self.snake.direction())
    }
}

/// Immutable view handed to renderers.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct GameSnapshot {
    pub snake: Vec<Position>,
    pub food: Option<Position>,
    pub phase: RunPhase,
    pub score: u32,
    pub elapsed: Duration,
    pub elapsed_label: String,
    pub difficulty: Difficulty,
    pub end_reason: Option<EndReason>,
    /// True when a finished run is waiting and would make the leaderboard.
    pub qualifies: bool,
    pub tick_count: u64,
}

/// Drives one player's games on a fixed-period tick.
///
/// All mutation goes through the command methods; there is no interior
/// mutability and no reentrancy, so each command runs to completion before
/// the next one is accepted.
#[derive(Debug)]
pub struct GameController<T: TimeSource = MonotonicTime> {
    config: GameConfig,
    board: Board,
    difficulty: Difficulty,
    state: GameState,
    leaderboard: Leaderboard,
    pending_result: Option<FinalResult>,
    rng: StdRng,
    time: T,
}

impl GameController<MonotonicTime> {
    /// Creates an idle controller with an entropy-seeded food spawner.
    #[must_use]
    pub fn new(config: GameConfig, leaderboard: Leaderboard) -> Self {
        Self::from_parts(config, leaderboard, StdRng::from_entropy(), MonotonicTime)
    }

    /// Creates a deterministic controller for tests and reproducible runs.
    #[must_use]
    pub fn with_seed(config: GameConfig, leaderboard: Leaderboard, seed: u64) -> Self {
        Self::with_time_source(config, leaderboard, seed, MonotonicTime)
    }
}

impl<T: TimeSource> GameController<T> {
    /// Creates a deterministic controller reading time from `time`.
    #[must_use]
    pub fn with_time_source(
        config: GameConfig,
        leaderboard: Leaderboard,
        seed: u64,
        time: T,
    ) -> Self {
        Self::from_parts(config, leaderboard, StdRng::seed_from_u64(seed), time)
    }

    fn from_parts(config: GameConfig, leaderboard: Leaderboard, rng: StdRng, time: T) -> Self {
        Self {
            board: Board::new(config.grid),
            state: GameState::idle(&config),
            config,
            difficulty: Difficulty::default(),
            leaderboard,
            pending_result: None,
            rng,
            time,
        }
    }

    /// Discards any current run and starts a new one.
    pub fn start_new_game(&mut self) {
        self.pending_result = None;
        self.state = GameState::idle(&self.config);
        self.state.clock.start(self.time.now());
        self.state.phase = RunPhase::Running;

        info!(difficulty = %self.difficulty, "game started");

        match spawn_food(&mut self.rng, self.board, &self.state.snake) {
            Some(food) => self.state.food = Some(food),
            None => self.finish(EndReason::BoardFilled),
        }
    }

    /// Discards any current run and returns to [`RunPhase::Idle`].
    pub fn reset(&mut self) {
        self.pending_result = None;
        self.state = GameState::idle(&self.config);
    }

    /// Buffers a direction change for the coming ticks.
    ///
    /// Ignored outside [`RunPhase::Running`]; reversals of the effective
    /// direction are dropped silently. Returns whether it was queued.
    pub fn enqueue_direction(&mut self, direction: Direction) -> bool {
        if self.state.phase != RunPhase::Running {
            return false;
        }
        let live = self.state.snake.direction();
        self.state.queue.enqueue(direction, live)
    }

    /// Switches between running and paused, folding the clock accordingly.
    /// Returns the resulting phase.
    pub fn toggle_pause(&mut self) -> RunPhase {
        let now = self.time.now();
        match self.state.phase {
            RunPhase::Running => {
                self.state.clock.pause(now);
                self.state.phase = RunPhase::Paused;
            }
            RunPhase::Paused => {
                self.state.clock.resume(now);
                self.state.phase = RunPhase::Running;
            }
            RunPhase::Idle | RunPhase::GameOver => {}
        }
        self.state.phase
    }

    /// Advances the simulation by one step.
    ///
    /// Outside [`RunPhase::Running`] this is a no-op, so a scheduler may keep
    /// ticking through pauses.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state.phase != RunPhase::Running {
            return TickOutcome::Skipped;
        }

        self.state.tick_count += 1;

        let live = self.state.snake.direction();
        let direction = self.state.queue.dequeue_next(live).unwrap_or(live);
        let next_head = self.state.snake.next_head_position(direction);
        let ate = self.state.food == Some(next_head);

        self.state.snake.advance(direction, ate);

        if let Some(collision) = collision::detect(&self.state.snake, self.board) {
            let reason = EndReason::Collision(collision);
            self.finish(reason);
            return TickOutcome::GameOver(reason);
        }

        if !ate {
            return TickOutcome::Moved;
        }

        debug!(length = self.state.snake.len(), "food eaten");
        match spawn_food(&mut self.rng, self.board, &self.state.snake) {
            Some(food) => {
                self.state.food = Some(food);
                TickOutcome::AteFood
            }
            None => {
                self.state.food = None;
                self.finish(EndReason::BoardFilled);
                TickOutcome::GameOver(EndReason::BoardFilled)
            }
        }
    }

    /// Changes the difficulty between runs.
    ///
    /// During a running or paused game this fails; the caller must confirm
    /// with the player and use [`GameController::restart_with_difficulty`].
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> Result<(), GameError> {
        if difficulty == self.difficulty {
            return Ok(());
        }

        if matches!(self.state.phase, RunPhase::Running | RunPhase::Paused) {
            return Err(GameError::DifficultyChangeRequiresConfirmation {
                current: self.difficulty,
                requested: difficulty,
            });
        }

        self.difficulty = difficulty;
        Ok(())
    }

    /// Applies a confirmed difficulty change by starting a fresh game.
    pub fn restart_with_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.start_new_game();
    }

    /// Records the finished run under `player_name` when it qualifies.
    ///
    /// The pending result is consumed either way. An absent or blank name
    /// records nothing. Returns the leaderboard rank of the new record.
    pub fn record_score_if_qualified(
        &mut self,
        player_name: Option<&str>,
    ) -> Result<Option<usize>, LeaderboardError> {
        let Some(result) = self.pending_result.take() else {
            return Ok(None);
        };

        let Some(name) = player_name.map(str::trim).filter(|name| !name.is_empty()) else {
            debug!(score = result.score, "no player name, result discarded");
            return Ok(None);
        };

        if !self.leaderboard.qualifies(result.difficulty, result.score) {
            return Ok(None);
        }

        let record = ScoreRecord::new(name, result.score, result.duration.as_secs());
        self.leaderboard.record(result.difficulty, record)
    }

    /// Builds an immutable snapshot for the rendering layer.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let elapsed = self.elapsed();
        GameSnapshot {
            snake: self.state.snake.segments().copied().collect(),
            food: self.state.food,
            phase: self.state.phase,
            score: self.state.score(),
            elapsed,
            elapsed_label: format_elapsed(elapsed),
            difficulty: self.difficulty,
            end_reason: self.state.end_reason,
            qualifies: self.pending_result_qualifies(),
            tick_count: self.state.tick_count,
        }
    }

    /// Active play time of the current run.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.state.clock.elapsed(self.time.now())
    }

    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.state.phase
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The finished run awaiting [`GameController::record_score_if_qualified`].
    #[must_use]
    pub fn pending_result(&self) -> Option<FinalResult> {
        self.pending_result
    }

    /// Whether the pending result would make the leaderboard.
    #[must_use]
    pub fn pending_result_qualifies(&self) -> bool {
        self.pending_result
            .is_some_and(|result| self.leaderboard.qualifies(result.difficulty, result.score))
    }

    #[must_use]
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// Mutable access for leaderboard maintenance such as deleting entries.
    pub fn leaderboard_mut(&mut self) -> &mut Leaderboard {
        &mut self.leaderboard
    }

    fn finish(&mut self, reason: EndReason) {
        let now = self.time.now();
        self.state.clock.stop(now);
        self.state.phase = RunPhase::GameOver;
        self.state.end_reason = Some(reason);

        let result = FinalResult {
            difficulty: self.difficulty,
            score: self.state.score(),
            duration: self.state.clock.elapsed(now),
        };
        info!(
            ?reason,
            score = result.score,
            seconds = result.duration.as_secs(),
            "game over"
        );
        self.pending_result = Some(result);
    }
}
