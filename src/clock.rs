use std::time::{Duration, Instant};

/// Source of monotonic instants for the controller.
///
/// Production code reads [`Instant::now`]; tests substitute a manual source
/// so pause accounting can be checked without sleeping.
pub trait TimeSource {
    fn now(&self) -> Instant;
}

/// [`TimeSource`] backed by the system monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicTime;

impl TimeSource for MonotonicTime {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Elapsed active play time across pause/resume cycles.
///
/// While running, `anchor` marks the last start or resume. Pausing folds the
/// time since the anchor into `accumulated` and clears the anchor.
#[derive(Debug, Clone, Copy, Default)]
pub struct GameClock {
    accumulated: Duration,
    anchor: Option<Instant>,
}

impl GameClock {
    /// Creates a stopped clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets to zero and starts running at `now`.
    pub fn start(&mut self, now: Instant) {
        self.accumulated = Duration::ZERO;
        self.anchor = Some(now);
    }

    /// Folds running time into the accumulator. No-op when already stopped.
    pub fn pause(&mut self, now: Instant) {
        if let Some(anchor) = self.anchor.take() {
            self.accumulated += now.saturating_duration_since(anchor);
        }
    }

    /// Takes a fresh anchor. No-op when already running.
    pub fn resume(&mut self, now: Instant) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    /// Freezes the clock for good at the end of a game.
    pub fn stop(&mut self, now: Instant) {
        self.pause(now);
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    /// Returns active time up to `now`.
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.anchor {
            Some(anchor) => self.accumulated + now.saturating_duration_since(anchor),
            None => self.accumulated,
        }
    }
}

/// Formats an elapsed duration the way the status line shows it.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("{}s", elapsed.as_secs())
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::{format_elapsed, GameClock};

    fn secs(value: u64) -> Duration {
        Duration::from_secs(value)
    }

    #[test]
    fn running_clock_tracks_time_since_start() {
        let t0 = Instant::now();
        let mut clock = GameClock::new();
        clock.start(t0);

        assert_eq!(clock.elapsed(t0 + secs(7)), secs(7));
    }

    #[test]
    fn paused_clock_does_not_advance() {
        let t0 = Instant::now();
        let mut clock = GameClock::new();
        clock.start(t0);
        clock.pause(t0 + secs(3));

        assert!(!clock.is_running());
        assert_eq!(clock.elapsed(t0 + secs(3)), secs(3));
        assert_eq!(clock.elapsed(t0 + secs(60)), secs(3));
    }

    #[test]
    fn resume_continues_from_accumulated_value() {
        let t0 = Instant::now();
        let mut clock = GameClock::new();
        clock.start(t0);
        clock.pause(t0 + secs(3));
        clock.resume(t0 + secs(10));

        assert_eq!(clock.elapsed(t0 + secs(12)), secs(5));

        clock.pause(t0 + secs(14));
        clock.resume(t0 + secs(20));
        assert_eq!(clock.elapsed(t0 + secs(21)), secs(8));
    }

    #[test]
    fn double_pause_and_double_resume_are_idempotent() {
        let t0 = Instant::now();
        let mut clock = GameClock::new();
        clock.start(t0);
        clock.pause(t0 + secs(2));
        clock.pause(t0 + secs(5));
        assert_eq!(clock.elapsed(t0 + secs(9)), secs(2));

        clock.resume(t0 + secs(9));
        clock.resume(t0 + secs(11));
        assert_eq!(clock.elapsed(t0 + secs(12)), secs(5));
    }

    #[test]
    fn start_discards_previous_run() {
        let t0 = Instant::now();
        let mut clock = GameClock::new();
        clock.start(t0);
        clock.stop(t0 + secs(30));

        clock.start(t0 + secs(40));
        assert_eq!(clock.elapsed(t0 + secs(41)), secs(1));
    }

    #[test]
    fn format_truncates_to_whole_seconds() {
        assert_eq!(format_elapsed(Duration::from_millis(12_999)), "12s");
        assert_eq!(format_elapsed(Duration::ZERO), "0s");
    }
}
