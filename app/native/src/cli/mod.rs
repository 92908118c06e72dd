//! CLI module for Deskmate.
//!
//! The CLI works directly on the data file, so it does not need the desktop
//! app to be running. Edits made while the app runs are picked up the next
//! time a widget reloads.

mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::DeskmateError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn run() -> Result<(), DeskmateError> {
    let cli = Cli::parse();
    cli.execute()
}
