use crate::task::error::{PlanError, PlanResult};
use crate::task::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Ordered collection of the day's tasks.
///
/// Hierarchy only lives in each task's breadcrumb; the forest itself is a
/// flat list whose order is the creation order, except for postponed tasks
/// which are moved to the end.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TaskForest {
    tasks: Vec<Task>,
}

impl TaskForest {
    /// Create a new empty forest
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already ordered list of tasks
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    /// Get a task by ID
    pub fn get_task(&self, task_id: TaskId) -> PlanResult<&Task> {
        self.tasks
            .iter()
            .find(|task| task.id == task_id)
            .ok_or(PlanError::NotFound(task_id))
    }

    /// Get a mutable reference to a task by ID
    pub fn get_task_mut(&mut self, task_id: TaskId) -> PlanResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|task| task.id == task_id)
            .ok_or(PlanError::NotFound(task_id))
    }

    /// Position of a task in the forest order
    pub fn position(&self, task_id: TaskId) -> PlanResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == task_id)
            .ok_or(PlanError::NotFound(task_id))
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|task| task.is_pending())
    }

    pub fn has_pending(&self) -> bool {
        self.tasks.iter().any(Task::is_pending)
    }

    /// IDs of every Done or Skipped task
    pub fn resolved_ids(&self) -> HashSet<TaskId> {
        self.tasks
            .iter()
            .filter(|task| task.is_resolved())
            .map(|task| task.id)
            .collect()
    }

    pub fn count_with_status(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|task| task.status == status).count()
    }

    /// Append tasks at the end, keeping their order
    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.extend(tasks);
    }

    /// Insert a task right after `reference_id`
    pub fn insert_after(&mut self, reference_id: TaskId, task: Task) -> PlanResult<()> {
        let index = self.position(reference_id)?;
        debug!("Inserting task {} after {}", task.id, reference_id);
        self.tasks.insert(index + 1, task);
        Ok(())
    }

    /// Move a task to the end of the forest. Order does not affect eligibility.
    pub fn move_to_end(&mut self, task_id: TaskId) -> PlanResult<()> {
        let index = self.position(task_id)?;
        let task = self.tasks.remove(index);
        self.tasks.push(task);
        Ok(())
    }

    /// Replace one task with `replacements` at the same position.
    ///
    /// Replacements without a dependency take over the replaced task's own
    /// dependency, and every task that waited for the replaced task now waits
    /// for the last replacement.
    pub fn replace_task(&mut self, task_id: TaskId, mut replacements: Vec<Task>) -> PlanResult<()> {
        let index = self.position(task_id)?;
        let Some(last_id) = replacements.last().map(|task| task.id) else {
            return Err(PlanError::validation("cannot replace a task with nothing"));
        };

        let inherited = self.tasks[index].depends_on;
        for task in replacements.iter_mut().filter(|task| task.depends_on.is_none()) {
            task.depends_on = inherited;
        }

        let mut rewired = 0;
        for task in self.tasks.iter_mut() {
            if task.depends_on == Some(task_id) {
                task.depends_on = Some(last_id);
                rewired += 1;
            }
        }

        self.tasks.splice(index..=index, replacements);
        debug!(
            "Replaced task {} and rewired {} dependents to {}",
            task_id, rewired, last_id
        );
        Ok(())
    }

    /// Check id uniqueness and that every dependency points inside the forest
    pub fn validate(&self) -> PlanResult<()> {
        let mut seen = HashSet::with_capacity(self.tasks.len());
        for task in &self.tasks {
            if !seen.insert(task.id) {
                return Err(PlanError::validation(format!(
                    "duplicate task id {}",
                    task.id
                )));
            }
        }

        for task in &self.tasks {
            if let Some(dependency) = task.depends_on
                && !seen.contains(&dependency)
            {
                return Err(PlanError::validation(format!(
                    "task '{}' depends on unknown task {}",
                    task.name, dependency
                )));
            }
        }

        Ok(())
    }

    /// Pending tasks prepared for carrying over into a new day.
    ///
    /// Only resolved tasks are left behind, so a dependency pointing outside
    /// the carried set was already satisfied and is dropped.
    pub fn carry_over_pending(&self) -> Vec<Task> {
        let carried: Vec<Task> = self.pending_tasks().cloned().collect();
        let carried_ids: HashSet<TaskId> = carried.iter().map(|task| task.id).collect();

        carried
            .into_iter()
            .map(|mut task| {
                if task
                    .depends_on
                    .is_some_and(|dependency| !carried_ids.contains(&dependency))
                {
                    task.depends_on = None;
                }
                task
            })
            .collect()
    }
}
