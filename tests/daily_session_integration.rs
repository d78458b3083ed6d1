//! Integration tests for a day's lifecycle on disk
//!
//! These tests use the file-backed session store and history log in a
//! temporary data directory, reopening the manager the way separate program
//! runs would.

use atomize::env;
use atomize::session::{FileHistoryLog, FileSessionStore, HistoryLog, TaskOutcome};
use atomize::task::{TaskManager, TaskManagerConfig, TaskStatus};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
}

fn open(data_dir: &Path, today: NaiveDate) -> TaskManager {
    TaskManager::open(
        Box::new(FileSessionStore::new(data_dir).unwrap()),
        Box::new(FileHistoryLog::new(data_dir).unwrap()),
        TaskManagerConfig::default(),
        today,
    )
}

fn id_of(manager: &TaskManager, name: &str) -> atomize::TaskId {
    manager
        .forest()
        .tasks()
        .iter()
        .find(|task| task.name == name)
        .unwrap()
        .id
}

#[test]
fn test_unfinished_day_carries_over() {
    let temp_dir = TempDir::new().unwrap();

    let mut monday = open(temp_dir.path(), day(2));
    monday
        .start_new_day("email, write-Report(draft, review), -tidy", Vec::new())
        .unwrap();
    monday.complete(id_of(&monday, "email")).unwrap();
    monday.complete(id_of(&monday, "write")).unwrap();
    drop(monday);

    let mut tuesday = open(temp_dir.path(), day(3));
    assert!(!tuesday.has_active_session());

    let overdue = tuesday.overdue_tasks();
    let names: Vec<&str> = overdue.iter().map(|task| task.name.as_str()).collect();
    assert_eq!(names, vec!["draft", "review", "tidy"]);
    assert!(overdue.iter().all(|task| task.depends_on.is_none()));
    assert!(overdue.iter().all(|task| task.is_pending()));

    tuesday.start_new_day("gym", overdue).unwrap();
    drop(tuesday);

    let stored = fs::read_to_string(env::session_file_path(temp_dir.path())).unwrap();
    assert!(stored.contains("\"date\": \"2024-09-03\""));

    let tuesday = open(temp_dir.path(), day(3));
    assert_eq!(tuesday.forest().len(), 4);
    assert!(tuesday.overdue_tasks().is_empty());

    let history = FileHistoryLog::new(temp_dir.path()).unwrap();
    assert_eq!(history.entries_for(day(2)).unwrap().len(), 2);
    assert!(history.entries_for(day(3)).unwrap().is_empty());
}

#[test]
fn test_discarding_overdue_tasks() {
    let temp_dir = TempDir::new().unwrap();

    let mut monday = open(temp_dir.path(), day(2));
    monday.start_new_day("a, b", Vec::new()).unwrap();
    drop(monday);

    let mut tuesday = open(temp_dir.path(), day(3));
    assert_eq!(tuesday.overdue_tasks().len(), 2);
    tuesday.start_new_day("c", Vec::new()).unwrap();

    let names: Vec<&str> = tuesday
        .forest()
        .tasks()
        .iter()
        .map(|task| task.name.as_str())
        .collect();
    assert_eq!(names, vec!["c"]);
}

#[test]
fn test_finished_day_lives_on_in_history() {
    let temp_dir = TempDir::new().unwrap();
    let mut rng = StdRng::seed_from_u64(11);

    let mut manager = open(temp_dir.path(), day(4));
    manager.start_new_day("a-b, c, -d", Vec::new()).unwrap();

    let mut postponed = false;
    while let Some(selection) = manager.next_task(&mut rng) {
        let task = selection.task;
        if !postponed {
            manager.postpone(task.id).unwrap();
            postponed = true;
        } else if task.name == "c" {
            manager.cancel(task.id).unwrap();
        } else {
            manager.complete(task.id).unwrap();
        }
    }

    assert!(!env::session_file_path(temp_dir.path()).exists());
    assert!(manager.forest().pending_tasks().next().is_none());
    assert_eq!(manager.forest().count_with_status(TaskStatus::Skipped), 1);

    let summary = manager.summary().unwrap();
    assert_eq!(summary.date, day(4));
    assert_eq!(summary.completed_count, 3);
    assert_eq!(summary.postponed_count, 1);
    assert!(summary.total_points == 30 || summary.total_points == 35);

    drop(manager);
    let reopened = open(temp_dir.path(), day(4));
    assert!(reopened.forest().is_empty());
    assert_eq!(reopened.summary().unwrap(), summary);

    let history = FileHistoryLog::new(temp_dir.path()).unwrap();
    let entries = history.entries().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(
        entries
            .iter()
            .filter(|entry| entry.outcome == TaskOutcome::Skipped)
            .count(),
        1
    );
}

#[test]
fn test_corrupt_session_starts_fresh() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(env::session_file_path(temp_dir.path()), "{\"date\": 12").unwrap();

    let mut manager = open(temp_dir.path(), day(5));
    assert!(manager.forest().is_empty());
    assert!(!env::session_file_path(temp_dir.path()).exists());

    manager.start_new_day("a", Vec::new()).unwrap();
    assert!(env::session_file_path(temp_dir.path()).exists());
}
