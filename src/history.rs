use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::passages::Difficulty;
use crate::results::SessionStats;

/// One finished session as written to the history log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: DateTime<Local>,
    pub username: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub wpm: u32,
    pub accuracy: u32,
    pub time_seconds: u64,
    pub slowest_word: String,
    pub slowest_time: f64,
}

impl HistoryEntry {
    pub fn new(
        username: &str,
        category: &str,
        difficulty: Difficulty,
        stats: &SessionStats,
    ) -> Self {
        Self {
            date: Local::now(),
            username: username.to_string(),
            category: category.to_string(),
            difficulty,
            wpm: stats.wpm,
            accuracy: stats.accuracy,
            time_seconds: stats.time_seconds,
            slowest_word: stats.slowest_word.clone(),
            slowest_time: stats.slowest_time,
        }
    }
}

/// Append-only CSV log of finished sessions
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // header only for a fresh file
        let needs_header = !self.path.exists();

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(entry)?;
        writer.flush()?;

        Ok(())
    }

    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        let mut entries = Vec::new();
        for entry in reader.deserialize() {
            entries.push(entry?);
        }
        Ok(entries)
    }
}
