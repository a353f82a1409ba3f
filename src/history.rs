use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::engine::SessionReport;

/// One row of the results log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub finished_at: DateTime<Local>,
    pub phrase: String,
    pub wpm: u32,
    pub accuracy: u32,
    pub errors: usize,
    pub elapsed_secs: f64,
}

impl HistoryRecord {
    pub fn from_report(report: &SessionReport, finished_at: DateTime<Local>) -> Self {
        Self {
            finished_at,
            phrase: report.phrase.clone(),
            wpm: report.score.wpm,
            accuracy: report.score.accuracy,
            errors: report.errors,
            elapsed_secs: (report.elapsed.as_secs_f64() * 100.0).round() / 100.0,
        }
    }
}

/// Append-only CSV log of completed sessions.
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

    pub fn append(&self, record: &HistoryRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        // header only goes into a brand new file
        let needs_header = fs::metadata(&self.path).map_or(true, |m| m.len() == 0);

        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// All records in file order. A missing file is an empty history.
    pub fn load(&self) -> Result<Vec<HistoryRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)
            .with_context(|| format!("opening {}", self.path.display()))?;
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<HistoryRecord>, csv::Error>>()
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(records)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub sessions: usize,
    pub mean_wpm: f64,
    pub best_wpm: u32,
    pub mean_accuracy: f64,
}

impl Summary {
    pub fn from_records(records: &[HistoryRecord]) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let n = records.len() as f64;
        Some(Self {
            sessions: records.len(),
            mean_wpm: records.iter().map(|r| r.wpm as f64).sum::<f64>() / n,
            best_wpm: records.iter().map(|r| r.wpm).max().unwrap_or_default(),
            mean_accuracy: records.iter().map(|r| r.accuracy as f64).sum::<f64>() / n,
        })
    }
}

/// Renders the last `limit` records plus a summary line for the terminal.
pub fn render_table(records: &[HistoryRecord], limit: usize) -> String {
    let Some(summary) = Summary::from_records(records) else {
        return "no sessions recorded yet".to_string();
    };

    let rows = records
        .iter()
        .rev()
        .take(limit)
        .map(|r| {
            format!(
                "{}  {:>4} wpm  {:>3}% acc  {:>3} err  {:>7.2}s  {}",
                r.finished_at.format("%Y-%m-%d %H:%M"),
                r.wpm,
                r.accuracy,
                r.errors,
                r.elapsed_secs,
                r.phrase
            )
        })
        .join("\n");

    format!(
        "{rows}\n\n{} sessions   {:.1} wpm avg   {} wpm best   {:.1}% acc avg",
        summary.sessions, summary.mean_wpm, summary.best_wpm, summary.mean_accuracy
    )
}
