//! Terminal rendering for menus, the current task and summaries.

use crate::cli::config::DisplayConfig;
use crate::session::DailySummary;
use crate::task::{SchedulingPhase, Task, TaskSelection, BREADCRUMB_SEPARATOR};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};
use std::collections::HashMap;
use std::io::{self, Write};

#[derive(Debug, Clone, Copy)]
enum Tone {
    Bold,
    Accent,
    Success,
    Warning,
    Danger,
    Special,
    Muted,
}

/// Writes the user-facing screens to `out`
pub struct Display<W: Write> {
    out: W,
    color: bool,
    overdue_preview_limit: usize,
}

impl<W: Write> Display<W> {
    pub fn new(out: W, config: &DisplayConfig) -> Self {
        Self {
            out,
            color: config.color,
            overdue_preview_limit: config.overdue_preview_limit,
        }
    }

    /// Plain output without styling or screen clearing
    pub fn plain(out: W) -> Self {
        Self {
            out,
            color: false,
            overdue_preview_limit: DisplayConfig::default().overdue_preview_limit,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.color {
            return text.to_string();
        }
        match tone {
            Tone::Bold => text.bold().to_string(),
            Tone::Accent => text.cyan().to_string(),
            Tone::Success => text.green().to_string(),
            Tone::Warning => text.yellow().to_string(),
            Tone::Danger => text.red().to_string(),
            Tone::Special => text.magenta().to_string(),
            Tone::Muted => text.dim().to_string(),
        }
    }

    fn key(&self, key: &str, tone: Tone, rest: &str) -> String {
        format!("[{}]{}", self.paint(key, tone), rest)
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        if self.color {
            execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        }
        Ok(())
    }

    pub fn show_main_menu(&mut self) -> io::Result<()> {
        let title = self.paint("atomize", Tone::Bold);
        writeln!(self.out, "{title}")?;
        writeln!(self.out, "\nChoose an action:")?;
        for (key, label) in [("1", "Plan"), ("2", "Continue"), ("3", "Summary"), ("4", "Quit")] {
            let line = self.key(key, Tone::Accent, &format!(" {label}"));
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    /// Current task framed by dashes, followed by the available actions
    pub fn show_current_task(&mut self, selection: &TaskSelection) -> io::Result<()> {
        let task = &selection.task;
        let progress = format!("[{}/{}]", selection.current_num, selection.total_num);
        let context = if task.breadcrumb.is_empty() {
            String::new()
        } else {
            format!("{}{}", task.breadcrumb_path(), BREADCRUMB_SEPARATOR)
        };

        let width =
            progress.chars().count() + context.chars().count() + task.name.chars().count() + 1;
        let rule = "-".repeat(width);
        let name = self.paint(&task.name, Tone::Bold);

        writeln!(self.out, "{rule}")?;
        write!(self.out, "{progress} {context}{name}")?;
        if selection.phase == SchedulingPhase::Late {
            let late = self.paint(" (late)", Tone::Muted);
            write!(self.out, "{late}")?;
        }
        writeln!(self.out)?;
        writeln!(self.out, "{rule}")?;

        let core = [
            self.key("d", Tone::Success, "one"),
            self.key("p", Tone::Warning, "ostpone"),
            self.key("q", Tone::Danger, "uit"),
        ];
        let edits = [
            self.key("s", Tone::Accent, "plit"),
            self.key("a", Tone::Accent, "dd"),
            self.key("e", Tone::Accent, "dit"),
            self.key("c", Tone::Special, "ancel"),
        ];
        let separator = self.paint("::", Tone::Muted);
        writeln!(
            self.out,
            "\nActions: {}  {}  {}",
            core.join(" | "),
            separator,
            edits.join(" | ")
        )
    }

    pub fn show_message(&mut self, message: &str) -> io::Result<()> {
        let line = self.paint(message, Tone::Success);
        writeln!(self.out, "{line}")
    }

    pub fn show_warning(&mut self, message: &str) -> io::Result<()> {
        let line = self.paint(message, Tone::Warning);
        writeln!(self.out, "{line}")
    }

    /// Preview of pending tasks left over from a previous day
    pub fn show_overdue_prompt(&mut self, overdue: &[Task]) -> io::Result<()> {
        let header = format!(
            "You have {} unfinished task(s) from a previous day:",
            overdue.len()
        );
        let header = self.paint(&header, Tone::Warning);
        writeln!(self.out, "{header}")?;

        for task in overdue.iter().take(self.overdue_preview_limit) {
            writeln!(self.out, "  - {}", task.display_path())?;
        }
        if overdue.len() > self.overdue_preview_limit {
            writeln!(
                self.out,
                "  ... and {} more",
                overdue.len() - self.overdue_preview_limit
            )?;
        }

        writeln!(self.out, "\nWhat should happen to them?")?;
        for (key, label) in [("1", "Merge into today"), ("2", "Discard"), ("3", "Back")] {
            let line = self.key(key, Tone::Accent, &format!(" {label}"));
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    pub fn show_summary(&mut self, summary: &DailySummary) -> io::Result<()> {
        let header = format!("Summary for {}", summary.date);
        let rule = "-".repeat(header.chars().count());
        let header = self.paint(&header, Tone::Bold);
        writeln!(self.out, "{header}")?;
        writeln!(self.out, "{rule}")?;

        let completed = self.paint(&summary.completed_count.to_string(), Tone::Accent);
        let points = self.paint(&format!("{} FP", summary.total_points), Tone::Success);
        let postponed = self.paint(&summary.postponed_count.to_string(), Tone::Warning);
        writeln!(self.out, "Completed tasks: {completed}")?;
        writeln!(self.out, "Focus points:    {points}")?;
        writeln!(self.out, "Postponed tasks: {postponed}")?;

        if summary.completed_count > 0 {
            writeln!(self.out, "\nWell done. Keep the focus tomorrow.")
        } else {
            writeln!(self.out, "\nNothing completed yet today.")
        }
    }

    /// Numbered listing of parsed tasks with their dependencies
    pub fn show_plan(&mut self, tasks: &[Task]) -> io::Result<()> {
        let numbers: HashMap<_, _> = tasks
            .iter()
            .enumerate()
            .map(|(index, task)| (task.id, index + 1))
            .collect();

        for (index, task) in tasks.iter().enumerate() {
            let mut line = format!("{:>3}. {}", index + 1, task.display_path());
            if let Some(number) = task.depends_on.and_then(|id| numbers.get(&id)) {
                line.push_str(&format!("  (after #{number})"));
            }
            if task.is_late {
                line.push_str(&self.paint("  [late]", Tone::Muted));
            }
            writeln!(self.out, "{line}")?;
        }
        writeln!(self.out, "{} task(s)", tasks.len())
    }

    /// Print `label` without a newline so input follows on the same line
    pub fn prompt(&mut self, label: &str) -> io::Result<()> {
        write!(self.out, "{label}")?;
        self.out.flush()
    }
}
