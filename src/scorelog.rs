use crate::app_dirs::AppDirs;
use chrono::prelude::*;
use itertools::Itertools;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// One finished round as recorded in the score log.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScoreEntry {
    pub date: String,
    pub pool: String,
    pub secs: u64,
    pub score: i32,
}

impl ScoreEntry {
    /// Timestamp parsed back from the logged RFC 3339 string.
    pub fn recorded_at(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.date).ok()
    }
}

/// Append-only CSV history of finished rounds.
#[derive(Debug, Clone)]
pub struct ScoreLog {
    path: PathBuf,
}

impl ScoreLog {
    pub fn new() -> Self {
        let path = AppDirs::log_path().unwrap_or_else(|| PathBuf::from("gissa_scores.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, pool: &str, secs: u64, score: i32) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !self.path.exists();

        let mut log_file = OpenOptions::new()
            .write(true)
            .append(true)
            .create(true)
            .open(&self.path)?;

        if needs_header {
            writeln!(log_file, "date,pool,secs,score")?;
        }

        writeln!(
            log_file,
            "{},{},{},{}",
            Local::now().to_rfc3339(),
            pool,
            secs,
            score,
        )?;

        Ok(())
    }

    /// All logged rounds in chronological order. Unreadable or missing logs
    /// read as empty; malformed rows are skipped.
    pub fn entries(&self) -> Vec<ScoreEntry> {
        match csv::Reader::from_path(&self.path) {
            Ok(mut reader) => reader.deserialize().flatten().collect(),
            Err(_) => vec![],
        }
    }

    pub fn personal_best(&self) -> Option<ScoreEntry> {
        self.entries().into_iter().max_by_key(|e| e.score)
    }

    /// The most recent scores, newest first.
    pub fn recent_scores(&self, count: usize) -> Vec<i32> {
        self.entries()
            .iter()
            .rev()
            .take(count)
            .map(|e| e.score)
            .collect()
    }

    /// Space-separated recent scores for the summary screen, newest first.
    pub fn recent_form(&self, count: usize) -> String {
        self.recent_scores(count).iter().join(" ")
    }
}

impl Default for ScoreLog {
    fn default() -> Self {
        Self::new()
    }
}
