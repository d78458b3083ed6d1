use crate::env;
use crate::task::forest::TaskForest;
use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, info};

/// Complete day state for persistence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Calendar day the forest belongs to
    pub date: NaiveDate,
    #[serde(rename = "tasks")]
    pub forest: TaskForest,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub postponed_today_count: u32,
}

impl SessionState {
    /// Empty state for `date`
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            forest: TaskForest::new(),
            total_points: 0,
            postponed_today_count: 0,
        }
    }

    /// Whether this state was created on an earlier day than `today`
    pub fn is_stale(&self, today: NaiveDate) -> bool {
        self.date < today
    }

    /// Whether there is still work to present
    pub fn is_active(&self) -> bool {
        self.forest.has_pending()
    }
}

/// Load/save port for the day's session.
///
/// Every mutating operation saves synchronously; there is at most one writer.
pub trait SessionStore {
    /// Load the stored session, `Ok(None)` when nothing is stored
    fn load(&self) -> Result<Option<SessionState>>;

    /// Replace the stored session with `state`
    fn save(&mut self, state: &SessionState) -> Result<()>;

    /// Remove the stored session
    fn clear(&mut self) -> Result<()>;
}

/// Session store backed by a JSON file inside the data directory
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    session_file: PathBuf,
    temp_file: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at `data_dir`, creating the directory if needed
    pub fn new(data_dir: &Path) -> Result<Self> {
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create directory: {}", data_dir.display()))?;

        Ok(Self {
            session_file: env::session_file_path(data_dir),
            temp_file: env::session_temp_file_path(data_dir),
        })
    }

    pub fn session_file(&self) -> &Path {
        &self.session_file
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<SessionState>> {
        if !self.session_file.exists() {
            debug!("No session file at {}", self.session_file.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&self.session_file)
            .with_context(|| format!("Failed to read {}", self.session_file.display()))?;
        let state: SessionState =
            serde_json::from_str(&content).context("Failed to deserialize session state")?;
        state
            .forest
            .validate()
            .map_err(|e| anyhow!("Session file is inconsistent: {}", e))?;

        debug!(
            "Loaded session for {} with {} tasks",
            state.date,
            state.forest.len()
        );
        Ok(Some(state))
    }

    fn save(&mut self, state: &SessionState) -> Result<()> {
        let content =
            serde_json::to_vec_pretty(state).context("Failed to serialize session state")?;

        // Write next to the target, then rename over it
        fs::write(&self.temp_file, &content)
            .with_context(|| format!("Failed to write {}", self.temp_file.display()))?;
        fs::rename(&self.temp_file, &self.session_file)
            .context("Failed to move session file into place")?;

        info!(
            "Session saved: {} bytes, {} tasks",
            content.len(),
            state.forest.len()
        );
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if self.session_file.exists() {
            fs::remove_file(&self.session_file)
                .with_context(|| format!("Failed to remove {}", self.session_file.display()))?;
            info!("Session file removed");
        }
        Ok(())
    }
}

/// In-memory session store; clones share the same slot
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Rc<RefCell<Option<SessionState>>>,
    saves: Rc<Cell<u32>>,
    fail_saves: Rc<Cell<bool>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with `state`
    pub fn with_state(state: SessionState) -> Self {
        let store = Self::default();
        store.slot.replace(Some(state));
        store
    }

    /// Currently stored state
    pub fn snapshot(&self) -> Option<SessionState> {
        self.slot.borrow().clone()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> u32 {
        self.saves.get()
    }

    /// Make subsequent saves fail, to exercise rollback paths
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.set(fail);
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<SessionState>> {
        Ok(self.snapshot())
    }

    fn save(&mut self, state: &SessionState) -> Result<()> {
        if self.fail_saves.get() {
            return Err(anyhow!("Session store is unavailable"));
        }
        self.slot.replace(Some(state.clone()));
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.slot.replace(None);
        Ok(())
    }
}
