use crate::session::history::{DailySummary, HistoryEntry, HistoryLog, TaskOutcome};
use crate::session::persistence::{SessionState, SessionStore};
use crate::task::error::{PlanError, PlanResult};
use crate::task::forest::TaskForest;
use crate::task::parser::PlanParser;
use crate::task::scheduler::{TaskScheduler, TaskSelection};
use crate::task::types::*;
use chrono::{Local, NaiveDate};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Owns the day's session and applies every lifecycle operation to it.
///
/// Each operation builds the next state on a copy, persists it through the
/// session store and only then replaces the current state, so a failure at
/// any step leaves the session untouched.
pub struct TaskManager {
    state: SessionState,
    stale: Option<SessionState>,
    store: Box<dyn SessionStore>,
    history: Box<dyn HistoryLog>,
    config: TaskManagerConfig,
}

/// Reward settings for completed tasks
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskManagerConfig {
    /// Focus points for every completed task
    pub points_base: u32,
    /// Extra points when the task had been postponed before completion
    pub postponed_bonus: u32,
}

/// Result of completing a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub task_name: String,
    pub points_earned: u32,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            points_base: 10,
            postponed_bonus: 5,
        }
    }
}

impl TaskManagerConfig {
    pub fn points_for(&self, task: &Task) -> u32 {
        if task.was_postponed() {
            self.points_base + self.postponed_bonus
        } else {
            self.points_base
        }
    }
}

/// Current calendar day in local time
pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl TaskManager {
    /// Open the session for `today`.
    ///
    /// A stored session from an earlier day is kept aside as stale so its
    /// pending tasks can be offered for carry-over. A session dated after
    /// `today` is ignored and replaced by the next save. A stored session
    /// that cannot be loaded is discarded.
    pub fn open(
        mut store: Box<dyn SessionStore>,
        history: Box<dyn HistoryLog>,
        config: TaskManagerConfig,
        today: NaiveDate,
    ) -> Self {
        let (state, stale) = match store.load() {
            Ok(Some(state)) if state.date == today => {
                info!(
                    "Resuming session for {} with {} tasks",
                    today,
                    state.forest.len()
                );
                (state, None)
            }
            Ok(Some(previous)) if previous.is_stale(today) => {
                info!("Found stale session from {}", previous.date);
                (SessionState::new(today), Some(previous))
            }
            Ok(Some(future)) => {
                warn!(
                    "Ignoring session dated {} which is after {}",
                    future.date, today
                );
                (SessionState::new(today), None)
            }
            Ok(None) => (SessionState::new(today), None),
            Err(e) => {
                warn!("Discarding unreadable session: {:#}", e);
                if let Err(e) = store.clear() {
                    warn!("Failed to remove unreadable session: {:#}", e);
                }
                (SessionState::new(today), None)
            }
        };

        Self {
            state,
            stale,
            store,
            history,
            config,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn forest(&self) -> &TaskForest {
        &self.state.forest
    }

    pub fn today(&self) -> NaiveDate {
        self.state.date
    }

    pub fn config(&self) -> &TaskManagerConfig {
        &self.config
    }

    /// Whether today's session still has pending tasks
    pub fn has_active_session(&self) -> bool {
        self.state.is_active()
    }

    /// Pending tasks of a stale session, ready to be carried over
    pub fn overdue_tasks(&self) -> Vec<Task> {
        self.stale
            .as_ref()
            .map(|stale| stale.forest.carry_over_pending())
            .unwrap_or_default()
    }

    /// Replace the session with a freshly parsed plan.
    ///
    /// `carried_over` tasks are placed ahead of the parsed ones. Only a plan
    /// that is empty on both sides is rejected.
    pub fn start_new_day(&mut self, text: &str, carried_over: Vec<Task>) -> PlanResult<()> {
        let parsed = PlanParser::parse(text)?;
        if parsed.is_empty() && carried_over.is_empty() {
            return Err(PlanError::EmptyPlan);
        }

        let carried_count = carried_over.len();
        let mut next = SessionState::new(self.today());
        next.forest.extend(carried_over);
        next.forest.extend(parsed);

        self.commit(next)?;
        self.stale = None;

        info!(
            "Started day {} with {} tasks ({} carried over)",
            self.today(),
            self.state.forest.len(),
            carried_count
        );
        Ok(())
    }

    /// Pick the next task to present.
    ///
    /// Once a non-empty forest has nothing pending, the stored session is
    /// removed; the day lives on in the history log.
    pub fn next_task<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<TaskSelection> {
        if !self.state.forest.has_pending() {
            if !self.state.forest.is_empty() {
                info!("All tasks resolved for {}", self.today());
                if let Err(e) = self.store.clear() {
                    warn!("Failed to clear finished session: {:#}", e);
                }
            }
            return None;
        }

        TaskScheduler::select_next_task(&self.state.forest, rng)
    }

    /// Mark a task done and award its focus points
    pub fn complete(&mut self, task_id: TaskId) -> PlanResult<CompletionOutcome> {
        let mut next = self.state.clone();

        let (entry, outcome) = {
            let task = next.forest.get_task_mut(task_id)?;
            ensure_pending(task)?;
            task.status = TaskStatus::Done;

            let points = self.config.points_for(task);
            let entry = HistoryEntry::for_task(task, next.date, TaskOutcome::Done, points);
            let outcome = CompletionOutcome {
                task_name: task.name.clone(),
                points_earned: points,
            };
            (entry, outcome)
        };
        next.total_points += outcome.points_earned;

        self.commit(next)?;
        self.record(&entry);

        info!(
            "Completed '{}' for {} points",
            outcome.task_name, outcome.points_earned
        );
        Ok(outcome)
    }

    /// Defer a task once by moving it to the end of the forest
    pub fn postpone(&mut self, task_id: TaskId) -> PlanResult<()> {
        let mut next = self.state.clone();

        {
            let task = next.forest.get_task_mut(task_id)?;
            ensure_pending(task)?;
            if !task.can_postpone() {
                return Err(PlanError::validation(format!(
                    "Task '{}' has already been postponed once",
                    task.name
                )));
            }
            task.postponed_count += 1;
        }
        next.postponed_today_count += 1;
        next.forest.move_to_end(task_id)?;

        self.commit(next)?;
        info!("Postponed task {}", task_id);
        Ok(())
    }

    /// Skip a task. Skipped tasks still unblock their dependents.
    pub fn cancel(&mut self, task_id: TaskId) -> PlanResult<()> {
        let mut next = self.state.clone();

        let entry = {
            let task = next.forest.get_task_mut(task_id)?;
            ensure_pending(task)?;
            task.status = TaskStatus::Skipped;
            HistoryEntry::for_task(task, next.date, TaskOutcome::Skipped, 0)
        };

        self.commit(next)?;
        self.record(&entry);
        info!("Cancelled '{}'", entry.task_name);
        Ok(())
    }

    /// Rename a task in place
    pub fn edit(&mut self, task_id: TaskId, new_name: &str) -> PlanResult<()> {
        let new_name = non_blank(new_name, "Task name must not be empty")?;
        let mut next = self.state.clone();

        next.forest.get_task_mut(task_id)?.name = new_name.to_string();

        self.commit(next)?;
        debug!("Renamed task {} to '{}'", task_id, new_name);
        Ok(())
    }

    /// Add a regular task right after `reference_id`, under the same breadcrumb
    pub fn insert_after(&mut self, reference_id: TaskId, name: &str) -> PlanResult<TaskId> {
        let name = non_blank(name, "Task name must not be empty")?;
        let mut next = self.state.clone();

        let breadcrumb = next.forest.get_task(reference_id)?.breadcrumb.clone();
        let task = Task::new(name, breadcrumb);
        let task_id = task.id;
        next.forest.insert_after(reference_id, task)?;

        self.commit(next)?;
        info!("Inserted '{}' after task {}", name, reference_id);
        Ok(task_id)
    }

    /// Replace a task with the tasks parsed from `expression`.
    ///
    /// The sub-tasks are nested under the task's breadcrumb and name and keep
    /// its late flag. Tasks that waited for the replaced task now wait for the
    /// last sub-task.
    pub fn split(&mut self, task_id: TaskId, expression: &str) -> PlanResult<Vec<TaskId>> {
        let expression = non_blank(expression, "Sub-task expression must not be empty")?;
        let mut next = self.state.clone();

        let original = next.forest.get_task(task_id)?.clone();
        ensure_pending(&original)?;

        let mut breadcrumb = original.breadcrumb.clone();
        breadcrumb.push(original.name.clone());

        let subtasks = PlanParser::parse_children(expression, &breadcrumb, original.is_late)?;
        if subtasks.is_empty() {
            return Err(PlanError::EmptyChildren {
                label: original.name,
            });
        }

        let subtask_ids: Vec<TaskId> = subtasks.iter().map(|task| task.id).collect();
        next.forest.replace_task(task_id, subtasks)?;

        self.commit(next)?;
        info!(
            "Split '{}' into {} sub-tasks",
            original.name,
            subtask_ids.len()
        );
        Ok(subtask_ids)
    }

    /// Today's report, from the session while it is active, else from history
    pub fn summary(&self) -> PlanResult<DailySummary> {
        if self.has_active_session() {
            return Ok(DailySummary::from_session(&self.state));
        }

        let entries = self.history.entries_for(self.today())?;
        Ok(DailySummary::from_history(self.today(), &entries))
    }

    fn commit(&mut self, next: SessionState) -> PlanResult<()> {
        self.store.save(&next)?;
        self.state = next;
        Ok(())
    }

    /// Append to the history log after the session is committed. The session
    /// stays authoritative, so a failed append is only logged.
    fn record(&mut self, entry: &HistoryEntry) {
        if let Err(e) = self.history.append(entry) {
            warn!(
                "Failed to record history for '{}': {:#}",
                entry.task_name, e
            );
        }
    }
}

fn ensure_pending(task: &Task) -> PlanResult<()> {
    if task.is_pending() {
        Ok(())
    } else {
        Err(PlanError::validation(format!(
            "Task '{}' is already {}",
            task.name, task.status
        )))
    }
}

fn non_blank<'a>(text: &'a str, message: &str) -> PlanResult<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(PlanError::validation(message))
    } else {
        Ok(trimmed)
    }
}
