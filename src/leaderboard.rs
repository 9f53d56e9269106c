use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::LeaderboardError;

/// One row of the leaderboard table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "Candidate")]
    pub candidate: String,
    #[serde(rename = "Score")]
    pub score: usize,
    #[serde(rename = "Percentage")]
    pub percentage: f64,
}

/// Append-only CSV table of finished interviews.
///
/// Each `record` rewrites the whole file. The in-process lock serialises
/// writers within this bot; separate processes sharing the file can still
/// lose updates.
pub struct LeaderboardStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LeaderboardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn record(&self, entry: LeaderboardEntry) -> Result<(), LeaderboardError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| LeaderboardError::Poisoned)?;

        let mut entries = self.load()?;
        entries.push(entry);

        let mut writer = csv::Writer::from_path(&self.path)?;
        for entry in &entries {
            writer.serialize(entry)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// All rows, highest score first. Ties keep their file order.
    pub fn read_all(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut entries = self.load()?;
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(entries)
    }

    /// Rows in file order; a missing file is an empty table.
    fn load(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::Reader::from_reader(file);
        reader
            .deserialize()
            .collect::<Result<Vec<LeaderboardEntry>, csv::Error>>()
            .map_err(LeaderboardError::from)
    }
}
