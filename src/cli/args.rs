//! Command line argument parsing
//!
//! This module handles CLI argument parsing with subcommands:
//! - `menu`: Interactive main menu (the default)
//! - `plan`: Start a new day from a plan expression
//! - `continue`: Resume today's session
//! - `summary`: Show today's summary
//! - `parse`: Dry run a plan expression without touching the session
//! - `show-config`: Show configuration discovery information, optionally
//!   writing a default user config

use super::interactive::OverdueChoice;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, PartialEq, Eq)]
pub enum ExecutionMode {
    Menu,
    Plan(PlanConfig),
    Continue,
    Summary,
    Parse { expression: String, json: bool },
    ShowConfig { init: bool },
}

#[derive(Debug, PartialEq, Eq)]
pub struct PlanConfig {
    /// Plan expression; prompted for when absent
    pub expression: Option<String>,
    /// What to do with yesterday's pending tasks; prompted for when absent
    pub overdue: Option<OverdueChoice>,
    /// Enter the execution loop once the plan is stored
    pub run: bool,
}

#[derive(Debug, Parser)]
#[command(name = "atomize")]
#[command(author = "Atomize Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Plan your day in one line, then work through it one task at a time")]
#[command(long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,
    /// Directory holding the session and history files
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,
    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open the interactive main menu
    Menu,
    /// Start a new day from a plan expression
    Plan {
        /// Plan, e.g. "email, write-Report(draft, review), -tidy desk"
        #[arg(allow_hyphen_values = true)]
        expression: Option<String>,
        /// Carry yesterday's pending tasks over into today
        #[arg(long = "merge", conflicts_with = "discard")]
        merge: bool,
        /// Drop yesterday's pending tasks
        #[arg(long = "discard")]
        discard: bool,
        /// Store the plan without starting the execution loop
        #[arg(long = "no-run")]
        no_run: bool,
    },
    /// Resume today's session
    Continue,
    /// Show today's summary
    Summary,
    /// Parse a plan expression and print the resulting tasks
    Parse {
        #[arg(allow_hyphen_values = true)]
        expression: String,
        /// Print tasks as JSON
        #[arg(long = "json")]
        json: bool,
    },
    /// Show configuration discovery information
    ShowConfig {
        /// Write a default config to ~/.atomize/config.toml if missing
        #[arg(long = "init")]
        init: bool,
    },
}

impl Args {
    pub fn parse() -> Self {
        Parser::parse()
    }

    pub fn mode(&self) -> ExecutionMode {
        match &self.command {
            None | Some(Commands::Menu) => ExecutionMode::Menu,
            Some(Commands::Plan {
                expression,
                merge,
                discard,
                no_run,
            }) => {
                let overdue = match (merge, discard) {
                    (true, _) => Some(OverdueChoice::Merge),
                    (_, true) => Some(OverdueChoice::Discard),
                    _ => None,
                };
                ExecutionMode::Plan(PlanConfig {
                    expression: expression.clone(),
                    overdue,
                    run: !no_run,
                })
            }
            Some(Commands::Continue) => ExecutionMode::Continue,
            Some(Commands::Summary) => ExecutionMode::Summary,
            Some(Commands::Parse { expression, json }) => ExecutionMode::Parse {
                expression: expression.clone(),
                json: *json,
            },
            Some(Commands::ShowConfig { init }) => ExecutionMode::ShowConfig { init: *init },
        }
    }

    /// Default tracing filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "atomize=debug"
        } else {
            "atomize=warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_command_opens_menu() {
        let args = Args::try_parse_from(["atomize"]).unwrap();
        assert_eq!(args.mode(), ExecutionMode::Menu);
        assert_eq!(args.log_filter(), "atomize=warn");
    }

    #[test]
    fn test_plan_command_with_merge() {
        let args =
            Args::try_parse_from(["atomize", "plan", "a-b, -c", "--merge", "--no-run"]).unwrap();

        assert_eq!(
            args.mode(),
            ExecutionMode::Plan(PlanConfig {
                expression: Some("a-b, -c".to_string()),
                overdue: Some(OverdueChoice::Merge),
                run: false,
            })
        );
    }

    #[test]
    fn test_plan_command_prompts_by_default() {
        let args = Args::try_parse_from(["atomize", "plan"]).unwrap();

        assert_eq!(
            args.mode(),
            ExecutionMode::Plan(PlanConfig {
                expression: None,
                overdue: None,
                run: true,
            })
        );
    }

    #[test]
    fn test_merge_conflicts_with_discard() {
        let result = Args::try_parse_from(["atomize", "plan", "a", "--merge", "--discard"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let args = Args::try_parse_from([
            "atomize",
            "summary",
            "--data-dir",
            "/tmp/atomize",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.mode(), ExecutionMode::Summary);
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/atomize")));
        assert_eq!(args.log_filter(), "atomize=debug");
    }

    #[test]
    fn test_parse_command() {
        let args = Args::try_parse_from(["atomize", "parse", "X(a,b)", "--json"]).unwrap();

        assert_eq!(
            args.mode(),
            ExecutionMode::Parse {
                expression: "X(a,b)".to_string(),
                json: true,
            }
        );
    }

    #[test]
    fn test_expression_may_start_with_late_marker() {
        let args = Args::try_parse_from(["atomize", "parse", "-tidy, a"]).unwrap();
        assert_eq!(
            args.mode(),
            ExecutionMode::Parse {
                expression: "-tidy, a".to_string(),
                json: false,
            }
        );

        let args =
            Args::try_parse_from(["atomize", "plan", "-wrap up, email", "--no-run"]).unwrap();
        assert_eq!(
            args.mode(),
            ExecutionMode::Plan(PlanConfig {
                expression: Some("-wrap up, email".to_string()),
                overdue: None,
                run: false,
            })
        );
    }

    #[test]
    fn test_show_config_init_flag() {
        let args = Args::try_parse_from(["atomize", "show-config", "--init"]).unwrap();
        assert_eq!(args.mode(), ExecutionMode::ShowConfig { init: true });
    }
}
