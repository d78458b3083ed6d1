//! Append-only record of task outcomes.
//!
//! Each completed or cancelled task produces one [`HistoryEntry`]. The file
//! backend stores one JSON object per line so appends never rewrite earlier
//! records.

use crate::env;
use crate::session::persistence::SessionState;
use crate::task::types::{Task, TaskStatus};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};

/// Terminal outcome recorded for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskOutcome {
    Done,
    Skipped,
}

/// One history record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub session_date: NaiveDate,
    pub task_name: String,
    pub breadcrumb: Vec<String>,
    pub outcome: TaskOutcome,
    pub was_postponed: bool,
    pub focus_points: u32,
}

impl HistoryEntry {
    pub fn for_task(
        task: &Task,
        session_date: NaiveDate,
        outcome: TaskOutcome,
        focus_points: u32,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            session_date,
            task_name: task.name.clone(),
            breadcrumb: task.breadcrumb.clone(),
            outcome,
            was_postponed: task.was_postponed(),
            focus_points,
        }
    }
}

/// Append-only port for task outcomes
pub trait HistoryLog {
    fn append(&mut self, entry: &HistoryEntry) -> Result<()>;

    /// Every recorded entry, oldest first
    fn entries(&self) -> Result<Vec<HistoryEntry>>;

    /// Entries recorded for the session of `date`
    fn entries_for(&self, date: NaiveDate) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|entry| entry.session_date == date)
            .collect())
    }
}

/// History log stored as JSON Lines in the data directory
#[derive(Debug, Clone)]
pub struct FileHistoryLog {
    path: PathBuf,
}

impl FileHistoryLog {
    pub fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create directory: {}", data_dir.display()))?;
        Ok(Self {
            path: env::history_file_path(data_dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryLog for FileHistoryLog {
    fn append(&mut self, entry: &HistoryEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry).context("Failed to serialize history entry")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .context("Failed to append history entry")?;

        debug!("Recorded {:?} for '{}'", entry.outcome, entry.task_name);
        Ok(())
    }

    fn entries(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)
            .with_context(|| format!("Failed to open {}", self.path.display()))?;

        let mut entries = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line.context("Failed to read history file")?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HistoryEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping unreadable history line {}: {}", line_num + 1, e),
            }
        }
        Ok(entries)
    }
}

/// In-memory history log; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryLog {
    entries: Rc<RefCell<Vec<HistoryEntry>>>,
    fail_appends: Rc<Cell<bool>>,
}

impl MemoryHistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Make subsequent appends fail
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.set(fail);
    }
}

impl HistoryLog for MemoryHistoryLog {
    fn append(&mut self, entry: &HistoryEntry) -> Result<()> {
        if self.fail_appends.get() {
            return Err(anyhow::anyhow!("History log is unavailable"));
        }
        self.entries.borrow_mut().push(entry.clone());
        Ok(())
    }

    fn entries(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self.entries.borrow().clone())
    }
}

/// Daily report shown from the main menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub completed_count: usize,
    pub total_points: u32,
    pub postponed_count: usize,
}

impl DailySummary {
    /// Summary of a session that still has work in it
    pub fn from_session(state: &SessionState) -> Self {
        Self {
            date: state.date,
            completed_count: state.forest.count_with_status(TaskStatus::Done),
            total_points: state.total_points,
            postponed_count: state.postponed_today_count as usize,
        }
    }

    /// Summary rebuilt from the history of `date`.
    ///
    /// A task postponed and later cancelled still counts as postponed; the
    /// same name under the same breadcrumb counts once.
    pub fn from_history(date: NaiveDate, entries: &[HistoryEntry]) -> Self {
        let done: Vec<&HistoryEntry> = entries
            .iter()
            .filter(|entry| entry.session_date == date && entry.outcome == TaskOutcome::Done)
            .collect();

        let postponed: HashSet<(&[String], &str)> = entries
            .iter()
            .filter(|entry| entry.session_date == date && entry.was_postponed)
            .map(|entry| (entry.breadcrumb.as_slice(), entry.task_name.as_str()))
            .collect();

        Self {
            date,
            completed_count: done.len(),
            total_points: done.iter().map(|entry| entry.focus_points).sum(),
            postponed_count: postponed.len(),
        }
    }
}
