use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{APP_DIR_NAME, LEADERBOARD_CAPACITY, SCORE_FILE_NAME};
use crate::difficulty::Difficulty;
use crate::error::LeaderboardError;

/// ctime-style layout, e.g. `Mon Oct 19 14:02:11 2026`.
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// When a record was created.
///
/// New records carry formatted local time; stores written by other tools may
/// hold epoch seconds instead, so both are accepted on read.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedAt {
    Text(String),
    Epoch(i64),
}

impl RecordedAt {
    #[must_use]
    pub fn now() -> Self {
        Self::Text(Local::now().format(TIMESTAMP_FORMAT).to_string())
    }
}

impl fmt::Display for RecordedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Epoch(seconds) => write!(f, "{seconds}"),
        }
    }
}

/// On-disk row: `[name, score, duration_secs, timestamp]`.
#[derive(Serialize, Deserialize)]
struct RecordRow(String, u32, u64, RecordedAt);

/// One finished game kept on the leaderboard.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "RecordRow", into = "RecordRow")]
pub struct ScoreRecord {
    player_name: String,
    score: u32,
    duration_secs: u64,
    recorded_at: RecordedAt,
}

impl ScoreRecord {
    /// Creates a record stamped with the current local time.
    #[must_use]
    pub fn new(player_name: impl Into<String>, score: u32, duration_secs: u64) -> Self {
        Self::with_timestamp(player_name, score, duration_secs, RecordedAt::now())
    }

    #[must_use]
    pub fn with_timestamp(
        player_name: impl Into<String>,
        score: u32,
        duration_secs: u64,
        recorded_at: RecordedAt,
    ) -> Self {
        Self {
            player_name: player_name.into(),
            score,
            duration_secs,
            recorded_at,
        }
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    #[must_use]
    pub fn recorded_at(&self) -> &RecordedAt {
        &self.recorded_at
    }
}

impl From<RecordRow> for ScoreRecord {
    fn from(RecordRow(player_name, score, duration_secs, recorded_at): RecordRow) -> Self {
        Self {
            player_name,
            score,
            duration_secs,
            recorded_at,
        }
    }
}

impl From<ScoreRecord> for RecordRow {
    fn from(record: ScoreRecord) -> Self {
        Self(
            record.player_name,
            record.score,
            record.duration_secs,
            record.recorded_at,
        )
    }
}

/// Returns the platform-correct leaderboard path.
#[must_use]
pub fn scores_path() -> PathBuf {
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push(APP_DIR_NAME);
    base.push(SCORE_FILE_NAME);
    base
}

/// Ranked top scores per difficulty.
///
/// Each table holds at most [`LEADERBOARD_CAPACITY`] records sorted by score,
/// highest first. Every mutation rewrites the backing file when one is set.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    path: Option<PathBuf>,
    tables: BTreeMap<Difficulty, Vec<ScoreRecord>>,
}

impl Leaderboard {
    /// Creates an empty leaderboard that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads the leaderboard stored at the platform data directory.
    #[must_use]
    pub fn load_default() -> Self {
        Self::load(scores_path())
    }

    /// Loads the leaderboard backed by `path`.
    ///
    /// A missing, unreadable or non-object file yields empty tables. Malformed
    /// tables or rows are dropped one by one. Later mutations still write to
    /// `path`.
    #[must_use]
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let tables = match read_tables(&path) {
            Ok(tables) => tables,
            Err(error) if error.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => {
                warn!(path = %path.display(), %error, "leaderboard unreadable, starting empty");
                BTreeMap::new()
            }
        };

        let mut board = Self {
            path: Some(path),
            tables,
        };
        board.normalize();
        board
    }

    /// Returns the backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the ranked records for `difficulty`.
    #[must_use]
    pub fn entries(&self, difficulty: Difficulty) -> &[ScoreRecord] {
        self.tables.get(&difficulty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the top record for `difficulty`.
    #[must_use]
    pub fn best(&self, difficulty: Difficulty) -> Option<&ScoreRecord> {
        self.entries(difficulty).first()
    }

    /// Returns whether `score` would earn a place on the `difficulty` table.
    ///
    /// A full table only admits scores strictly above its lowest entry.
    #[must_use]
    pub fn qualifies(&self, difficulty: Difficulty, score: u32) -> bool {
        let entries = self.entries(difficulty);
        if entries.len() < LEADERBOARD_CAPACITY {
            return true;
        }
        entries.last().is_some_and(|lowest| score > lowest.score)
    }

    /// Inserts `entry`, keeps the table ranked and capped, then persists.
    ///
    /// Returns the zero-based rank of the new entry, or `None` when it did not
    /// survive the cut. Entries tied with existing ones rank below them.
    pub fn record(
        &mut self,
        difficulty: Difficulty,
        entry: ScoreRecord,
    ) -> Result<Option<usize>, LeaderboardError> {
        let table = self.tables.entry(difficulty).or_default();
        let rank = table.partition_point(|existing| existing.score >= entry.score);

        if rank >= LEADERBOARD_CAPACITY {
            return Ok(None);
        }

        info!(
            %difficulty,
            player = entry.player_name(),
            score = entry.score,
            rank,
            "leaderboard entry recorded"
        );
        table.insert(rank, entry);
        table.truncate(LEADERBOARD_CAPACITY);

        self.persist()?;
        Ok(Some(rank))
    }

    /// Removes every record on `difficulty` matching `predicate`, persisting
    /// when anything changed. Returns the number of records removed.
    pub fn delete<F>(
        &mut self,
        difficulty: Difficulty,
        mut predicate: F,
    ) -> Result<usize, LeaderboardError>
    where
        F: FnMut(&ScoreRecord) -> bool,
    {
        let Some(table) = self.tables.get_mut(&difficulty) else {
            return Ok(0);
        };

        let before = table.len();
        table.retain(|record| !predicate(record));
        let removed = before - table.len();

        if removed > 0 {
            info!(%difficulty, removed, "leaderboard entries deleted");
            self.persist()?;
        }
        Ok(removed)
    }

    /// Removes the records at the given zero-based ranks.
    pub fn delete_ranks(
        &mut self,
        difficulty: Difficulty,
        ranks: &[usize],
    ) -> Result<usize, LeaderboardError> {
        let mut rank = 0;
        self.delete(difficulty, |_| {
            let selected = ranks.contains(&rank);
            rank += 1;
            selected
        })
    }

    /// Writes every table to the backing file, replacing its content.
    pub fn persist(&self) -> Result<(), LeaderboardError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(&self.persisted_tables())?;
        write_file(path, &json).map_err(|source| LeaderboardError::Io {
            path: path.clone(),
            source,
        })
    }

    /// Every difficulty appears in the file, even with no records.
    fn persisted_tables(&self) -> BTreeMap<Difficulty, &[ScoreRecord]> {
        Difficulty::ALL
            .into_iter()
            .map(|difficulty| (difficulty, self.entries(difficulty)))
            .collect()
    }

    /// Re-ranks and caps tables that came from an external file.
    fn normalize(&mut self) {
        for table in self.tables.values_mut() {
            table.sort_by(|a, b| b.score.cmp(&a.score));
            table.truncate(LEADERBOARD_CAPACITY);
        }
    }
}

/// Reads the score file one difficulty at a time.
///
/// Only a file that is not a JSON object fails as a whole. A table that is not
/// an array, or a row that does not decode, is dropped on its own so the other
/// tables survive the next write.
fn read_tables(path: &Path) -> io::Result<BTreeMap<Difficulty, Vec<ScoreRecord>>> {
    let raw = fs::read_to_string(path)?;
    let mut document: BTreeMap<String, serde_json::Value> = serde_json::from_str(&raw)
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;

    let mut tables = BTreeMap::new();
    for difficulty in Difficulty::ALL {
        let Some(value) = document.remove(difficulty.name()) else {
            continue;
        };
        let rows = match serde_json::from_value::<Vec<serde_json::Value>>(value) {
            Ok(rows) => rows,
            Err(error) => {
                warn!(path = %path.display(), %difficulty, %error, "dropping malformed table");
                continue;
            }
        };

        let table = rows
            .into_iter()
            .enumerate()
            .filter_map(|(row, value)| match serde_json::from_value::<ScoreRecord>(value) {
                Ok(record) => Some(record),
                Err(error) => {
                    warn!(path = %path.display(), %difficulty, row, %error, "dropping malformed record");
                    None
                }
            })
            .collect();
        tables.insert(difficulty, table);
    }

    for key in document.keys() {
        warn!(path = %path.display(), key = %key, "ignoring unknown leaderboard table");
    }
    Ok(tables)
}

fn write_file(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{Leaderboard, RecordedAt, ScoreRecord};
    use crate::config::LEADERBOARD_CAPACITY;
    use crate::difficulty::Difficulty;
    use crate::error::LeaderboardError;

    fn record(name: &str, score: u32) -> ScoreRecord {
        ScoreRecord::with_timestamp(name, score, 10, RecordedAt::Epoch(0))
    }

    fn filled(difficulty: Difficulty, scores: &[u32]) -> Leaderboard {
        let mut board = Leaderboard::in_memory();
        for (index, score) in scores.iter().enumerate() {
            board
                .record(difficulty, record(&format!("p{index}"), *score))
                .expect("in-memory record should succeed");
        }
        board
    }

    #[test]
    fn empty_table_qualifies_anything() {
        let board = Leaderboard::in_memory();
        assert!(board.qualifies(Difficulty::Fast, 1));
    }

    #[test]
    fn full_table_requires_strictly_higher_score() {
        let board = filled(Difficulty::Medium, &[9, 8, 7, 6, 5, 5, 4, 3, 3, 2]);

        assert!(!board.qualifies(Difficulty::Medium, 2));
        assert!(board.qualifies(Difficulty::Medium, 3));
        assert!(board.qualifies(Difficulty::Slow, 1));
    }

    #[test]
    fn tie_below_capacity_still_qualifies() {
        let board = filled(Difficulty::Slow, &[4, 4]);
        assert!(board.qualifies(Difficulty::Slow, 4));
        assert!(board.qualifies(Difficulty::Slow, 1));
    }

    #[test]
    fn record_keeps_descending_order_and_returns_rank() {
        let mut board = filled(Difficulty::Fast, &[10, 5, 1]);

        let rank = board
            .record(Difficulty::Fast, record("new", 5))
            .expect("in-memory record should succeed");

        // Ties rank below existing entries.
        assert_eq!(rank, Some(2));
        let scores: Vec<_> = board.entries(Difficulty::Fast).iter().map(ScoreRecord::score).collect();
        assert_eq!(scores, vec![10, 5, 5, 1]);
        assert_eq!(board.entries(Difficulty::Fast)[2].player_name(), "new");
    }

    #[test]
    fn table_never_exceeds_capacity() {
        let scores: Vec<u32> = (1..=25).collect();
        let board = filled(Difficulty::Medium, &scores);

        let entries = board.entries(Difficulty::Medium);
        assert_eq!(entries.len(), LEADERBOARD_CAPACITY);
        assert_eq!(entries[0].score(), 25);
        assert_eq!(entries[LEADERBOARD_CAPACITY - 1].score(), 16);
        assert!(entries.windows(2).all(|pair| pair[0].score() >= pair[1].score()));
    }

    #[test]
    fn non_qualifying_record_is_dropped() {
        let mut board = filled(Difficulty::Slow, &[9, 9, 9, 9, 9, 9, 9, 9, 9, 9]);

        let rank = board
            .record(Difficulty::Slow, record("late", 9))
            .expect("in-memory record should succeed");

        assert_eq!(rank, None);
        assert!(board.entries(Difficulty::Slow).iter().all(|entry| entry.player_name() != "late"));
    }

    #[test]
    fn delete_by_predicate_and_rank() {
        let mut board = filled(Difficulty::Medium, &[7, 6, 5, 4]);

        let removed = board
            .delete(Difficulty::Medium, |entry| entry.score() == 6)
            .expect("delete should succeed");
        assert_eq!(removed, 1);

        let removed = board
            .delete_ranks(Difficulty::Medium, &[0, 2])
            .expect("delete should succeed");
        assert_eq!(removed, 2);

        let scores: Vec<_> = board.entries(Difficulty::Medium).iter().map(ScoreRecord::score).collect();
        assert_eq!(scores, vec![5]);
        assert_eq!(board.delete(Difficulty::Fast, |_| true).expect("no-op"), 0);
    }

    #[test]
    fn persisted_rows_use_four_element_arrays() {
        let path = unique_test_path("format");
        let mut board = Leaderboard::load(&path);
        board
            .record(Difficulty::Fast, record("ada", 12))
            .expect("record should persist");

        let raw = fs::read_to_string(&path).expect("leaderboard file should exist");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");

        assert_eq!(value["Fast"][0], serde_json::json!(["ada", 12, 10, 0]));
        assert_eq!(value["Slow"], serde_json::json!([]));
        assert_eq!(value["Medium"], serde_json::json!([]));
        cleanup_test_path(&path);
    }

    #[test]
    fn reload_restores_tables() {
        let path = unique_test_path("reload");
        let mut board = Leaderboard::load(&path);
        board
            .record(Difficulty::Slow, ScoreRecord::new("grace", 3, 42))
            .expect("record should persist");

        let reloaded = Leaderboard::load(&path);

        assert_eq!(reloaded.entries(Difficulty::Slow), board.entries(Difficulty::Slow));
        assert!(matches!(
            reloaded.entries(Difficulty::Slow)[0].recorded_at(),
            RecordedAt::Text(_)
        ));
        cleanup_test_path(&path);
    }

    #[test]
    fn legacy_file_with_string_timestamps_and_missing_keys_loads() {
        let path = unique_test_path("legacy");
        write_raw(
            &path,
            r#"{ "Medium": [["bob", 3, 20, "Sat Jan  4 10:00:00 2025"], ["amy", 8, 60, "Sun Jan  5 11:00:00 2025"]] }"#,
        );

        let board = Leaderboard::load(&path);

        let entries = board.entries(Difficulty::Medium);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].player_name(), "amy");
        assert_eq!(
            entries[1].recorded_at().to_string(),
            "Sat Jan  4 10:00:00 2025"
        );
        assert!(board.entries(Difficulty::Fast).is_empty());
        cleanup_test_path(&path);
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let path = unique_test_path("corrupt");
        write_raw(&path, "not-json");

        let board = Leaderboard::load(&path);

        assert!(Difficulty::ALL.iter().all(|d| board.entries(*d).is_empty()));
        cleanup_test_path(&path);
    }

    #[test]
    fn malformed_row_only_drops_itself() {
        let path = unique_test_path("bad-row");
        write_raw(
            &path,
            r#"{"Slow":[["amy",9,10,"x"]],"Medium":[],"Fast":[[123,4,10,"Mon"],["kim",2,5,0]],"Turbo":[]}"#,
        );

        let mut board = Leaderboard::load(&path);
        assert_eq!(board.entries(Difficulty::Slow).len(), 1);
        assert_eq!(board.entries(Difficulty::Slow)[0].player_name(), "amy");
        let fast: Vec<_> = board.entries(Difficulty::Fast).iter().map(ScoreRecord::player_name).collect();
        assert_eq!(fast, vec!["kim"]);

        board
            .record(Difficulty::Medium, record("z", 1))
            .expect("record should persist");

        let reloaded = Leaderboard::load(&path);
        assert_eq!(reloaded.entries(Difficulty::Slow), board.entries(Difficulty::Slow));
        assert_eq!(reloaded.entries(Difficulty::Slow)[0].score(), 9);
        assert_eq!(reloaded.entries(Difficulty::Fast)[0].player_name(), "kim");
        assert_eq!(reloaded.entries(Difficulty::Medium)[0].player_name(), "z");
        cleanup_test_path(&path);
    }

    #[test]
    fn malformed_table_keeps_the_others() {
        let path = unique_test_path("bad-table");
        write_raw(&path, r#"{"Slow":{"amy":9},"Medium":[["bob",3,20,0]]}"#);

        let board = Leaderboard::load(&path);

        assert!(board.entries(Difficulty::Slow).is_empty());
        assert_eq!(board.entries(Difficulty::Medium)[0].player_name(), "bob");
        cleanup_test_path(&path);
    }

    #[test]
    fn deletes_are_written_to_disk() {
        let path = unique_test_path("delete");
        let mut board = Leaderboard::load(&path);
        board
            .record(Difficulty::Fast, record("a", 8))
            .expect("record should persist");
        board
            .record(Difficulty::Fast, record("b", 3))
            .expect("record should persist");

        let removed = board
            .delete_ranks(Difficulty::Fast, &[0])
            .expect("delete should persist");
        assert_eq!(removed, 1);

        let reloaded = Leaderboard::load(&path);
        let names: Vec<_> = reloaded.entries(Difficulty::Fast).iter().map(ScoreRecord::player_name).collect();
        assert_eq!(names, vec!["b"]);

        let before = fs::read_to_string(&path).expect("leaderboard file should exist");
        let removed = board
            .delete(Difficulty::Fast, |entry| entry.player_name() == "nobody")
            .expect("no-op delete");
        assert_eq!(removed, 0);
        let after = fs::read_to_string(&path).expect("leaderboard file should exist");
        assert_eq!(before, after);
        cleanup_test_path(&path);
    }

    #[test]
    fn unwritable_path_reports_io_error_and_keeps_memory_state() {
        let blocker = unique_test_path("blocker");
        write_raw(&blocker, "file, not a directory");
        let mut board = Leaderboard::load(blocker.join("scores.json"));

        let result = board.record(Difficulty::Fast, record("eve", 4));

        assert!(matches!(result, Err(LeaderboardError::Io { .. })));
        assert_eq!(board.entries(Difficulty::Fast).len(), 1);
        cleanup_test_path(&blocker);
    }

    fn write_raw(path: &PathBuf, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("test parent directory should be creatable");
        }
        fs::write(path, contents).expect("test file write should succeed");
    }

    fn unique_test_path(label: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time should be after epoch")
            .as_nanos();

        std::env::temp_dir()
            .join("snake-engine-leaderboard-tests")
            .join(format!("{label}-{nanos}.json"))
    }

    fn cleanup_test_path(path: &PathBuf) {
        let _ = fs::remove_file(path);
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir(parent);
        }
    }
}
