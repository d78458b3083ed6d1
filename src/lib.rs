//! # Atomize
//!
//! Plan a whole day as one compact expression and work through it one atomic
//! task at a time.
//!
//! ## Architecture Overview
//!
//! - **[`task`]**: plan grammar parsing, the day's task forest, the selection
//!   scheduler and the lifecycle operations that mutate the forest
//! - **[`session`]**: date-keyed session persistence and the append-only
//!   history log
//! - **[`cli`]**: argument parsing, configuration discovery, terminal
//!   rendering and the interactive loop
//!
//! ## Plan grammar
//!
//! - `a, b, c`: independent tasks, presented in random order
//! - `a-b-c`: a chain, each task waits for the previous one
//! - `Label(x, y)` or `Label[x, y]`: a group, `Label` is only shown as context
//! - `prep-Label(x, y)`: `x` and `y` wait for `prep`
//! - `-wrap up`: a late task, offered only after every regular task
//!
//! ## Quick Start
//!
//! ```rust
//! use atomize::task::{PlanParser, TaskForest, TaskScheduler};
//! use rand::SeedableRng;
//!
//! let tasks = PlanParser::parse("email, write-Report(draft, review), -tidy desk").unwrap();
//! let forest = TaskForest::from_tasks(tasks);
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let selection = TaskScheduler::select_next_task(&forest, &mut rng).unwrap();
//! assert!(selection.task.name == "email" || selection.task.name == "write");
//! ```

/// Plan parsing, scheduling and lifecycle operations.
pub mod task;

/// Session persistence and history logging.
pub mod session;

/// Command line interface and terminal presentation.
pub mod cli;

/// Environment constants and path utilities.
///
/// Centralizes all hardcoded paths and file names used throughout
/// the application for easier maintenance and consistency.
pub mod env;

// Re-export main task types
pub use task::{
    PlanError, PlanParser, Task, TaskForest, TaskId, TaskManager, TaskManagerConfig,
    TaskScheduler, TaskSelection, TaskStatus,
};

// Re-export session types
pub use session::{
    DailySummary, FileHistoryLog, FileSessionStore, HistoryLog, SessionState, SessionStore,
};
