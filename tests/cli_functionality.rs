//! Integration tests for CLI functionality
//!
//! These tests drive the interactive session with scripted input and check
//! both what is shown and what ends up in the session.

use atomize::cli::{Display, InteractiveSession, OverdueChoice};
use atomize::session::{MemoryHistoryLog, MemorySessionStore, SessionState};
use atomize::task::{PlanParser, TaskManager, TaskManagerConfig, TaskStatus};
use chrono::NaiveDate;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Cursor;

type ScriptedSession = InteractiveSession<Cursor<Vec<u8>>, Vec<u8>, StdRng>;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 11, 20).unwrap()
}

fn manager_with(store: MemorySessionStore) -> TaskManager {
    TaskManager::open(
        Box::new(store),
        Box::new(MemoryHistoryLog::new()),
        TaskManagerConfig::default(),
        today(),
    )
}

fn session(manager: TaskManager, script: &str) -> ScriptedSession {
    InteractiveSession::new(
        manager,
        Cursor::new(script.as_bytes().to_vec()),
        Display::plain(Vec::new()),
        StdRng::seed_from_u64(3),
    )
}

fn finish(session: ScriptedSession) -> (TaskManager, String) {
    let (manager, display) = session.into_parts();
    (manager, String::from_utf8(display.into_inner()).unwrap())
}

fn stale_store(plan: &str) -> MemorySessionStore {
    let mut previous = SessionState::new(today().pred_opt().unwrap());
    previous.forest.extend(PlanParser::parse(plan).unwrap());
    MemorySessionStore::with_state(previous)
}

#[test]
fn test_plan_and_complete_chain() {
    let mut session = session(manager_with(MemorySessionStore::new()), "d\nd\n");

    let stored = session.plan_day(Some("a-b".to_string()), None, true).unwrap();
    assert!(stored);

    let (manager, output) = finish(session);
    assert!(output.contains("Plan stored with 2 task(s)."));
    assert!(output.contains("[1/2] a"));
    assert!(output.contains("+10 focus points! 'a' is done."));
    assert!(output.contains("[2/2] b"));
    assert!(output.contains("All tasks are done for today!"));
    assert_eq!(manager.state().total_points, 20);
}

#[test]
fn test_menu_flow() {
    let script = "1\nx, y\nq\n3\n\n9\n4\n";
    let mut session = session(manager_with(MemorySessionStore::new()), script);

    session.run_menu().unwrap();

    let (manager, output) = finish(session);
    assert!(output.contains("[1] Plan"));
    assert!(output.contains("Plan stored with 2 task(s)."));
    assert!(output.contains("Paused. Continue from the main menu."));
    assert!(output.contains("Summary for 2024-11-20"));
    assert!(output.contains("Completed tasks: 0"));
    assert!(output.contains("Unknown option '9'"));
    assert!(output.ends_with("See you tomorrow.\n"));
    assert!(manager.has_active_session());
}

#[test]
fn test_menu_ends_at_end_of_input() {
    let mut session = session(manager_with(MemorySessionStore::new()), "2\n");

    session.run_menu().unwrap();

    let (_, output) = finish(session);
    assert!(output.contains("No active session for today"));
}

#[test]
fn test_empty_plan_is_rejected() {
    let mut session = session(manager_with(MemorySessionStore::new()), "   \n");

    assert!(!session.plan_day(None, None, false).unwrap());

    let (manager, output) = finish(session);
    assert!(output.contains("Input must not be empty."));
    assert!(manager.forest().is_empty());
}

#[test]
fn test_syntax_error_is_reported() {
    let mut session = session(manager_with(MemorySessionStore::new()), "");

    assert!(!session.plan_day(Some("Work(a".to_string()), None, false).unwrap());

    let (manager, output) = finish(session);
    assert!(output.contains("Unbalanced brackets in 'Work(a'"));
    assert!(manager.forest().is_empty());
}

#[test]
fn test_overdue_prompt_discard() {
    let store = stale_store("old one, old two");
    let mut session = session(manager_with(store), "7\n2\nfresh\n");

    assert!(session.plan_day(None, None, false).unwrap());

    let (manager, output) = finish(session);
    assert!(output.contains("You have 2 unfinished task(s) from a previous day:"));
    assert!(output.contains("  - old one"));
    assert!(output.contains("Please choose 1, 2 or 3."));
    let names: Vec<&str> = manager
        .forest()
        .tasks()
        .iter()
        .map(|task| task.name.as_str())
        .collect();
    assert_eq!(names, vec!["fresh"]);
}

#[test]
fn test_overdue_merge_with_empty_plan() {
    let store = stale_store("old one, old two");
    let mut session = session(manager_with(store), "1\n\n");

    assert!(session.plan_day(None, None, false).unwrap());

    let (manager, _) = finish(session);
    assert_eq!(manager.forest().len(), 2);
    assert_eq!(manager.today(), today());
}

#[test]
fn test_overdue_back_returns_without_planning() {
    let store = stale_store("old one");
    let mut session = session(manager_with(store.clone()), "3\n");

    assert!(!session.plan_day(Some("new".to_string()), None, false).unwrap());

    let (manager, _) = finish(session);
    assert!(manager.forest().is_empty());
    assert_eq!(manager.overdue_tasks().len(), 1);
    assert_eq!(store.save_count(), 0);
}

#[test]
fn test_overdue_choice_from_flag_skips_prompt() {
    let store = stale_store("old one");
    let mut session = session(manager_with(store), "");

    assert!(
        session
            .plan_day(Some("new".to_string()), Some(OverdueChoice::Merge), false)
            .unwrap()
    );

    let (manager, output) = finish(session);
    assert!(!output.contains("unfinished task(s)"));
    assert_eq!(manager.forest().len(), 2);
}

#[test]
fn test_postpone_only_once() {
    let mut session = session(manager_with(MemorySessionStore::new()), "p\np\nd\n");

    session.plan_day(Some("a".to_string()), None, true).unwrap();

    let (manager, output) = finish(session);
    assert!(output.contains("Postponed. It will come back later."));
    assert!(output.contains("Task 'a' has already been postponed once"));
    assert!(output.contains("+15 focus points! 'a' is done."));
    assert_eq!(manager.state().postponed_today_count, 1);
}

#[test]
fn test_split_then_work_through_subtasks() {
    let mut session = session(manager_with(MemorySessionStore::new()), "s\nx-y\nd\nd\n");

    session.plan_day(Some("big".to_string()), None, true).unwrap();

    let (manager, output) = finish(session);
    assert!(output.contains("Split into 2 sub-task(s)."));
    assert!(output.contains("[1/2] big > x"));
    assert!(output.contains("[2/2] big > y"));
    assert_eq!(manager.forest().count_with_status(TaskStatus::Done), 2);
}

#[test]
fn test_edit_add_and_cancel() {
    let script = "e\n\ne\nrenamed\nc\nn\na\nextra\nc\ny\nc\nyes\n";
    let mut session = session(manager_with(MemorySessionStore::new()), script);

    session.plan_day(Some("task".to_string()), None, true).unwrap();

    let (manager, output) = finish(session);
    assert!(output.contains("Rename [task]: "));
    assert!(output.contains("Name unchanged."));
    assert!(output.contains("Task renamed."));
    assert!(output.contains("Kept the task."));
    assert!(output.contains("Added 'extra'."));
    assert_eq!(output.matches("cancelled.").count(), 2);
    assert!(output.contains("All tasks are done for today!"));

    let mut names: Vec<&str> = manager
        .forest()
        .tasks()
        .iter()
        .map(|task| task.name.as_str())
        .collect();
    names.sort();
    assert_eq!(names, vec!["extra", "renamed"]);
    assert_eq!(manager.forest().count_with_status(TaskStatus::Skipped), 2);
    assert_eq!(manager.state().total_points, 0);
}

#[test]
fn test_unknown_action_and_end_of_input() {
    let mut session = session(manager_with(MemorySessionStore::new()), "z\n");

    session.plan_day(Some("a".to_string()), None, true).unwrap();

    let (manager, output) = finish(session);
    assert!(output.contains("Unknown action 'z'"));
    assert!(manager.has_active_session());
}

#[test]
fn test_continue_resumes_active_session() {
    let store = MemorySessionStore::new();
    {
        let mut manager = manager_with(store.clone());
        manager.start_new_day("a", Vec::new()).unwrap();
    }

    let mut session = session(manager_with(store.clone()), "d\n");
    session.continue_day().unwrap();

    let (_, output) = finish(session);
    assert!(output.contains("+10 focus points! 'a' is done."));
    assert!(store.snapshot().is_none());
}
