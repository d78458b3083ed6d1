use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for tasks
pub type TaskId = Uuid;

/// Separator used when a breadcrumb is rendered as a single line
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// Maximum number of times a single task may be postponed
pub const MAX_POSTPONEMENTS: u8 = 1;

/// Atomic unit of work produced by the plan parser
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    /// Labels of the enclosing groups, outermost first. Display only.
    pub breadcrumb: Vec<String>,
    pub status: TaskStatus,
    pub postponed_count: u8,
    pub depends_on: Option<TaskId>,
    pub is_late: bool,
}

/// Task status. `Done` and `Skipped` are terminal.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to be presented
    Pending,
    /// Completed by the user
    Done,
    /// Cancelled by the user; still satisfies dependents
    Skipped,
}

impl Task {
    /// Create a pending task with no dependency
    pub fn new(name: &str, breadcrumb: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.trim().to_string(),
            breadcrumb,
            status: TaskStatus::Pending,
            postponed_count: 0,
            depends_on: None,
            is_late: false,
        }
    }

    /// Set the predecessor this task waits for
    pub fn with_dependency(mut self, depends_on: Option<TaskId>) -> Self {
        self.depends_on = depends_on;
        self
    }

    /// Mark the task as belonging to the late phase
    pub fn with_late(mut self, is_late: bool) -> Self {
        self.is_late = is_late;
        self
    }

    /// Check if task is still waiting to be worked on
    pub fn is_pending(&self) -> bool {
        self.status == TaskStatus::Pending
    }

    /// Check if task is in a terminal state
    pub fn is_resolved(&self) -> bool {
        !self.is_pending()
    }

    /// Check whether the single allowed postponement has been used
    pub fn can_postpone(&self) -> bool {
        self.is_pending() && self.postponed_count < MAX_POSTPONEMENTS
    }

    pub fn was_postponed(&self) -> bool {
        self.postponed_count > 0
    }

    /// Breadcrumb rendered as `a > b`, empty when the task is top level
    pub fn breadcrumb_path(&self) -> String {
        self.breadcrumb.join(BREADCRUMB_SEPARATOR)
    }

    /// Breadcrumb followed by the task name
    pub fn display_path(&self) -> String {
        if self.breadcrumb.is_empty() {
            self.name.clone()
        } else {
            format!(
                "{}{}{}",
                self.breadcrumb_path(),
                BREADCRUMB_SEPARATOR,
                self.name
            )
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
            TaskStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
