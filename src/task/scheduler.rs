use crate::task::forest::TaskForest;
use crate::task::types::*;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{debug, warn};

/// Picks the next task to present.
///
/// Selection is deterministic at the gate level (late phase, dependencies)
/// and uniformly random among the tasks that pass every gate.
pub struct TaskScheduler;

/// Scheduling phase the selected task was drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingPhase {
    Regular,
    Late,
}

/// Task selection result
#[derive(Debug, Clone, Serialize)]
pub struct TaskSelection {
    pub task: Task,
    /// Resolved task count plus one, for progress display
    pub current_num: usize,
    pub total_num: usize,
    pub phase: SchedulingPhase,
}

impl TaskScheduler {
    /// Select the next task to present, or `None` when nothing is eligible.
    ///
    /// `None` covers both an exhausted forest and a forest whose pending tasks
    /// are all blocked; parser output never produces the latter.
    pub fn select_next_task<R: Rng + ?Sized>(
        forest: &TaskForest,
        rng: &mut R,
    ) -> Option<TaskSelection> {
        let Some(phase) = Self::current_phase(forest) else {
            debug!("No pending tasks left");
            return None;
        };

        let available = Self::eligible_tasks(forest);
        let Some(task) = available.choose(rng) else {
            warn!(
                "Forest has pending tasks but none is eligible in the {:?} phase",
                phase
            );
            return None;
        };

        debug!(
            "Selected task {} among {} eligible in the {:?} phase",
            task.id,
            available.len(),
            phase
        );

        Some(TaskSelection {
            task: (*task).clone(),
            current_num: forest.len() - forest.count_with_status(TaskStatus::Pending) + 1,
            total_num: forest.len(),
            phase,
        })
    }

    /// Phase the forest is in, `None` once nothing is pending.
    ///
    /// Late tasks are only considered after every regular task is resolved.
    pub fn current_phase(forest: &TaskForest) -> Option<SchedulingPhase> {
        let mut phase = None;
        for task in forest.pending_tasks() {
            if !task.is_late {
                return Some(SchedulingPhase::Regular);
            }
            phase = Some(SchedulingPhase::Late);
        }
        phase
    }

    /// Every task that could be selected right now, in forest order
    pub fn eligible_tasks(forest: &TaskForest) -> Vec<&Task> {
        let Some(phase) = Self::current_phase(forest) else {
            return Vec::new();
        };
        let late_phase = phase == SchedulingPhase::Late;
        let resolved = forest.resolved_ids();

        forest
            .pending_tasks()
            .filter(|task| task.is_late == late_phase)
            .filter(|task| {
                task.depends_on
                    .is_none_or(|dependency| resolved.contains(&dependency))
            })
            .collect()
    }
}
