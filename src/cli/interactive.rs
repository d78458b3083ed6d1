//! Interactive main menu and task execution loop.
//!
//! Input is read line by line from any `BufRead`, so the loop can be driven
//! by a terminal or by a scripted buffer. End of input behaves like quitting.

use crate::cli::display::Display;
use crate::task::{PlanError, TaskManager, TaskSelection};
use anyhow::Result;
use rand::Rng;
use std::io::{BufRead, Write};
use tracing::{debug, warn};

/// What to do with pending tasks left over from a previous day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverdueChoice {
    Merge,
    Discard,
    Back,
}

impl OverdueChoice {
    pub fn from_input(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "m" | "merge" => Some(OverdueChoice::Merge),
            "2" | "d" | "discard" => Some(OverdueChoice::Discard),
            "3" | "b" | "back" => Some(OverdueChoice::Back),
            _ => None,
        }
    }
}

/// Result of handling one action on the presented task
#[derive(Debug, PartialEq, Eq)]
enum LoopControl {
    Continue,
    Pause,
}

pub struct InteractiveSession<I: BufRead, W: Write, G: Rng> {
    manager: TaskManager,
    input: I,
    display: Display<W>,
    rng: G,
}

impl<I: BufRead, W: Write, G: Rng> InteractiveSession<I, W, G> {
    pub fn new(manager: TaskManager, input: I, display: Display<W>, rng: G) -> Self {
        Self {
            manager,
            input,
            display,
            rng,
        }
    }

    pub fn manager(&self) -> &TaskManager {
        &self.manager
    }

    pub fn into_parts(self) -> (TaskManager, Display<W>) {
        (self.manager, self.display)
    }

    /// Main menu loop, until the user quits or input ends
    pub fn run_menu(&mut self) -> Result<()> {
        loop {
            self.display.clear_screen()?;
            self.display.show_main_menu()?;
            self.display.prompt("> ")?;

            let Some(choice) = self.read_line()? else {
                break;
            };

            match choice.trim() {
                "1" => {
                    self.plan_day(None, None, true)?;
                }
                "2" => self.continue_day()?,
                "3" => {
                    self.show_summary()?;
                    self.display.prompt("\nPress Enter to return to the menu")?;
                    if self.read_line()?.is_none() {
                        break;
                    }
                }
                "4" | "q" => {
                    self.display.show_message("See you tomorrow.")?;
                    break;
                }
                other => self
                    .display
                    .show_warning(&format!("Unknown option '{other}'"))?,
            }
        }
        Ok(())
    }

    /// Start a new day, prompting for whatever was not given.
    ///
    /// Returns whether a new plan was stored.
    pub fn plan_day(
        &mut self,
        expression: Option<String>,
        overdue_choice: Option<OverdueChoice>,
        run: bool,
    ) -> Result<bool> {
        let overdue = self.manager.overdue_tasks();
        let choice = if overdue.is_empty() {
            OverdueChoice::Discard
        } else if let Some(choice) = overdue_choice {
            choice
        } else {
            self.display.show_overdue_prompt(&overdue)?;
            match self.prompt_overdue_choice()? {
                Some(choice) => choice,
                None => return Ok(false),
            }
        };

        if choice == OverdueChoice::Back {
            debug!("Planning abandoned at the overdue prompt");
            return Ok(false);
        }

        let expression = match expression {
            Some(expression) => expression,
            None => {
                self.display
                    .prompt("Plan your day (e.g. email, write-Report(draft, review), -tidy): ")?;
                match self.read_line()? {
                    Some(line) => line,
                    None => return Ok(false),
                }
            }
        };

        if expression.trim().is_empty() && choice != OverdueChoice::Merge {
            self.display.show_warning("Input must not be empty.")?;
            return Ok(false);
        }

        let carried = if choice == OverdueChoice::Merge {
            overdue
        } else {
            Vec::new()
        };

        if let Err(e) = self.manager.start_new_day(&expression, carried) {
            self.report(&e)?;
            return Ok(false);
        }

        let count = self.manager.forest().len();
        self.display
            .show_message(&format!("Plan stored with {count} task(s)."))?;

        if run {
            self.run_tasks()?;
        }
        Ok(true)
    }

    /// Resume today's session if it still has pending tasks
    pub fn continue_day(&mut self) -> Result<()> {
        if !self.manager.has_active_session() {
            self.display
                .show_warning("No active session for today. Plan a new day first.")?;
            return Ok(());
        }
        self.run_tasks()
    }

    pub fn show_summary(&mut self) -> Result<()> {
        match self.manager.summary() {
            Ok(summary) => self.display.show_summary(&summary)?,
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    /// Present tasks one at a time until everything is resolved or the user
    /// pauses
    pub fn run_tasks(&mut self) -> Result<()> {
        loop {
            let Some(selection) = self.manager.next_task(&mut self.rng) else {
                if self.manager.has_active_session() {
                    warn!("Pending tasks remain but none can be selected");
                    self.display
                        .show_warning("Remaining tasks are blocked by unfinished dependencies.")?;
                } else {
                    self.display.show_message("All tasks are done for today!")?;
                }
                return Ok(());
            };

            self.display.clear_screen()?;
            self.display.show_current_task(&selection)?;
            self.display.prompt("> ")?;

            let Some(action) = self.read_line()? else {
                return Ok(());
            };

            if self.handle_action(action.trim(), &selection)? == LoopControl::Pause {
                return Ok(());
            }
        }
    }

    fn handle_action(&mut self, action: &str, selection: &TaskSelection) -> Result<LoopControl> {
        let task = &selection.task;

        match action.to_lowercase().as_str() {
            "d" | "done" => match self.manager.complete(task.id) {
                Ok(outcome) => self.display.show_message(&format!(
                    "+{} focus points! '{}' is done.",
                    outcome.points_earned, outcome.task_name
                ))?,
                Err(e) => self.report(&e)?,
            },
            "p" | "postpone" => match self.manager.postpone(task.id) {
                Ok(()) => self
                    .display
                    .show_message("Postponed. It will come back later.")?,
                Err(e) => self.report(&e)?,
            },
            "q" | "quit" => {
                self.display
                    .show_message("Paused. Continue from the main menu.")?;
                return Ok(LoopControl::Pause);
            }
            "s" | "split" => {
                self.display.prompt("Split into: ")?;
                let Some(expression) = self.read_line()? else {
                    return Ok(LoopControl::Pause);
                };
                if expression.trim().is_empty() {
                    self.display.show_warning("Nothing to split into.")?;
                } else {
                    match self.manager.split(task.id, &expression) {
                        Ok(ids) => self
                            .display
                            .show_message(&format!("Split into {} sub-task(s).", ids.len()))?,
                        Err(e) => self.report(&e)?,
                    }
                }
            }
            "a" | "add" => {
                self.display.prompt("New task: ")?;
                let Some(name) = self.read_line()? else {
                    return Ok(LoopControl::Pause);
                };
                if name.trim().is_empty() {
                    self.display.show_warning("Nothing added.")?;
                } else {
                    match self.manager.insert_after(task.id, &name) {
                        Ok(_) => self
                            .display
                            .show_message(&format!("Added '{}'.", name.trim()))?,
                        Err(e) => self.report(&e)?,
                    }
                }
            }
            "e" | "edit" => {
                self.display.prompt(&format!("Rename [{}]: ", task.name))?;
                let Some(name) = self.read_line()? else {
                    return Ok(LoopControl::Pause);
                };
                if name.trim().is_empty() {
                    self.display.show_message("Name unchanged.")?;
                } else {
                    match self.manager.edit(task.id, &name) {
                        Ok(()) => self.display.show_message("Task renamed.")?,
                        Err(e) => self.report(&e)?,
                    }
                }
            }
            "c" | "cancel" => {
                self.display
                    .prompt(&format!("Cancel '{}'? [y/N]: ", task.name))?;
                let Some(answer) = self.read_line()? else {
                    return Ok(LoopControl::Pause);
                };
                if matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                    match self.manager.cancel(task.id) {
                        Ok(()) => self
                            .display
                            .show_message(&format!("'{}' cancelled.", task.name))?,
                        Err(e) => self.report(&e)?,
                    }
                } else {
                    self.display.show_message("Kept the task.")?;
                }
            }
            other => self
                .display
                .show_warning(&format!("Unknown action '{other}'"))?,
        }

        Ok(LoopControl::Continue)
    }

    fn prompt_overdue_choice(&mut self) -> Result<Option<OverdueChoice>> {
        loop {
            self.display.prompt("> ")?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match OverdueChoice::from_input(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => self.display.show_warning("Please choose 1, 2 or 3.")?,
            }
        }
    }

    fn report(&mut self, error: &PlanError) -> Result<()> {
        warn!("Operation rejected: {}", error);
        self.display.show_warning(&error.to_string())?;
        Ok(())
    }

    /// Next input line without its line ending, `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overdue_choice_from_input() {
        assert_eq!(OverdueChoice::from_input("1"), Some(OverdueChoice::Merge));
        assert_eq!(OverdueChoice::from_input(" Discard "), Some(OverdueChoice::Discard));
        assert_eq!(OverdueChoice::from_input("b"), Some(OverdueChoice::Back));
        assert_eq!(OverdueChoice::from_input("4"), None);
    }
}
