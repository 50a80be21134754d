//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the fabula binary.

mod commands;
mod extract;
mod run;

pub use commands::{Cli, Commands};
pub use extract::extract_file;
pub use run::run_storyboard;
