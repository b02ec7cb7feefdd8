use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};

use defense_data::profile::PlayerRunRecord;
use defense_data::result::LeaderboardEntry;
use log::{info, warn};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};

use crate::config::GameConfig;
use crate::error::StoreError;

pub const LEADERBOARD_HEADER: [&str; 4] = ["Name", "Score", "Date", "Music"];

pub const PLAYER_HEADER: [&str; 15] = [
    "Name",
    "Score",
    "Total Blocks",
    "Just in Time",
    "Normal",
    "Too Early",
    "Up",
    "Down",
    "Left",
    "Right",
    "Start Time",
    "End Time",
    "Duration",
    "Music",
    "Average Reaction Time",
];

const MAX_FILE_NAME_LEN: usize = 10;

/// Append-only CSV persistence: one global leaderboard plus one history file
/// per player. The only state kept between runs.
pub struct LeaderboardStore {
    leaderboard_path: PathBuf,
    players_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LeaderboardStore {
    pub fn new(root: impl AsRef<Path>, config: &GameConfig) -> Self {
        let root = root.as_ref();
        Self {
            leaderboard_path: root.join(&config.leaderboard_file),
            players_dir: root.join(&config.players_dir),
            write_lock: Mutex::new(()),
        }
    }

    pub fn leaderboard_path(&self) -> &Path {
        &self.leaderboard_path
    }

    pub fn player_path(&self, name: &str) -> PathBuf {
        self.players_dir.join(format!("{}.csv", sanitize_player_name(name)))
    }

    pub fn append(&self, entry: &LeaderboardEntry) -> Result<(), StoreError> {
        self.append_row(&self.leaderboard_path, &LEADERBOARD_HEADER, entry)
    }

    pub fn append_player_record(&self, record: &PlayerRunRecord) -> Result<PathBuf, StoreError> {
        let path = self.player_path(&record.name);
        self.append_row(&path, &PLAYER_HEADER, record)?;
        Ok(path)
    }

    /// Persists a finished run: player history first, then the leaderboard.
    pub fn record_run(&self, record: &PlayerRunRecord) -> Result<(), StoreError> {
        let player_path = self.append_player_record(record)?;
        self.append(&record.leaderboard_entry())?;
        info!(
            "run saved: {} scored {} ({})",
            record.name,
            record.score,
            player_path.display()
        );
        Ok(())
    }

    /// Best `n` runs, highest score first; equal scores keep file order.
    /// A missing or unreadable leaderboard is an empty one.
    pub fn top_entries(&self, n: usize) -> Vec<LeaderboardEntry> {
        let mut entries: Vec<LeaderboardEntry> = read_rows(&self.leaderboard_path);
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(n);
        entries
    }

    pub fn player_history(&self, name: &str) -> Vec<PlayerRunRecord> {
        read_rows(&self.player_path(name))
    }

    fn append_row<T: Serialize>(&self, path: &Path, header: &[&str], row: &T) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let io_err = |source| StoreError::Io { path: path.to_path_buf(), source };
        let csv_err = |source| StoreError::Csv { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;

        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer.write_record(header).map_err(csv_err)?;
        }
        writer.serialize(row).map_err(csv_err)?;
        writer.flush().map_err(io_err)
    }
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    let mut reader = match csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
    {
        Ok(reader) => reader,
        Err(_) => return Vec::new(),
    };

    match reader.deserialize().collect::<Result<Vec<T>, _>>() {
        Ok(rows) => rows,
        Err(e) => {
            warn!("ignoring malformed file {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Keeps alphanumerics only, at most ten of them; `player` if nothing is left.
pub fn sanitize_player_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric())
        .take(MAX_FILE_NAME_LEN)
        .collect();
    if cleaned.is_empty() {
        "player".to_string()
    } else {
        cleaned
    }
}
