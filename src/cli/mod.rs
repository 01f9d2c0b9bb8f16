//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, the terminal host, and
//! subcommand handlers.

mod args;
mod commands;
mod host;

pub use args::{parse_selection, Args, Command, ConfigAction, EditorArgs};
pub use commands::{handle_config_action, run_html, run_snapshot, run_start, CliError};
pub use host::{detect_language, TerminalHost};
