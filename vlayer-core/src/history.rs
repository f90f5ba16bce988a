//! history.rs - Append-only log of compact scan summaries.
//!
//! History answers "is this project getting better or worse" without
//! storing full scan results. Entries are appended after each run and
//! capped; the trend compares the newest score to the oldest score still
//! retained, and best/worst range over everything retained, not just a
//! displayed slice. A missing or empty log is the normal first-run state.
//!
//! License: MIT OR APACHE 2.0

use crate::errors::Result;
use crate::finding::ScanResult;
use crate::scoring::SeverityBreakdown;
use crate::store;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

const HISTORY_FILE: &str = "history.json";

/// Oldest entries are dropped past this count.
pub const HISTORY_RETENTION: usize = 50;

/// One run's compact summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub score: u8,
    pub severity_counts: SeverityBreakdown,
    pub files_scanned: usize,
}

/// The retained run log, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanHistory {
    pub entries: Vec<HistoryEntry>,
}

impl ScanHistory {
    /// Appends a run summary, dropping the oldest entries past the
    /// retention cap.
    pub fn record(&mut self, result: &ScanResult, now: DateTime<Utc>) {
        self.push_entry(HistoryEntry {
            date: now,
            score: result.compliance_score.score,
            severity_counts: result.compliance_score.breakdown,
            files_scanned: result.scanned_files,
        });
    }

    pub fn push_entry(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
        if self.entries.len() > HISTORY_RETENTION {
            let excess = self.entries.len() - HISTORY_RETENTION;
            self.entries.drain(..excess);
        }
    }

    /// Up to `n` entries, newest first.
    pub fn recent(&self, n: usize) -> Vec<&HistoryEntry> {
        self.entries.iter().rev().take(n).collect()
    }

    /// Latest score minus the oldest retained score. `None` when empty.
    pub fn trend(&self) -> Option<i32> {
        let oldest = self.entries.first()?;
        let latest = self.entries.last()?;
        Some(i32::from(latest.score) - i32::from(oldest.score))
    }

    /// Highest score over every retained entry.
    pub fn best(&self) -> Option<u8> {
        self.entries.iter().map(|e| e.score).max()
    }

    /// Lowest score over every retained entry.
    pub fn worst(&self) -> Option<u8> {
        self.entries.iter().map(|e| e.score).min()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A missing log loads as an empty history.
    pub fn load(root: &Path) -> Result<Self> {
        Ok(store::read_json(&store::state_path(root, HISTORY_FILE))?.unwrap_or_default())
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        store::write_json_atomic(&store::state_path(root, HISTORY_FILE), self)
    }
}

/// Loads the project history, appends this run, and persists it.
pub fn append_run(root: &Path, result: &ScanResult, now: DateTime<Utc>) -> Result<ScanHistory> {
    let mut history = ScanHistory::load(root)?;
    history.record(result, now);
    history.save(root)?;
    Ok(history)
}
