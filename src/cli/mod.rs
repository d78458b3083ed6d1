//! CLI-specific functionality for atomize
//!
//! This module contains all CLI-related code including argument parsing,
//! configuration discovery, terminal rendering and the interactive loop.

pub mod args;
pub mod config;
pub mod display;
pub mod interactive;

pub use args::{Args, ExecutionMode, PlanConfig};
pub use config::{AtomizeConfig, ConfigDiscovery, DisplayConfig};
pub use display::Display;
pub use interactive::{InteractiveSession, OverdueChoice};
