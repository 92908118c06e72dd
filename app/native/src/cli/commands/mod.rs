//! CLI command definitions using Clap.
//!
//! Commands are organized into domain-specific submodules:
//!
//! - `workspaces` - Overview of stored desktop notes
//! - `history` - Completed-task log and archived sessions

use std::io;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Generator, Shell, generate};
use deskmate_core::schema;
use deskmate_core::store::DataStore;

use crate::config;
use crate::error::DeskmateError;

pub mod history;
pub mod workspaces;

pub use history::{CompletedCommands, SessionCommands};

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Deskmate CLI - inspect and manage the per-desktop notes of Deskmate.
#[derive(Parser, Debug)]
#[command(name = "deskmate")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH")]
    pub config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// List desktops with stored notes.
    ///
    /// Shows the title, open and total task counts, and color of every
    /// desktop that has notes in the data file.
    Workspaces {
        /// Output as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Completed-task log commands.
    #[command(subcommand)]
    Completed(CompletedCommands),

    /// Session archive commands.
    ///
    /// A new session archives every desktop's title and tasks and starts
    /// from empty lists. Archived sessions can be restored per desktop.
    #[command(subcommand)]
    Session(SessionCommands),

    /// Output Deskmate configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// Deskmate configuration file. Can be redirected to a file for use with
    /// editors that support JSON Schema validation.
    Schema,

    /// Generate shell completions.
    ///
    /// Usage:
    ///   eval "$(deskmate completions --shell zsh)"
    ///   deskmate completions --shell fish > ~/.config/fish/completions/deskmate.fish
    Completions {
        /// The shell to generate completions for.
        #[arg(long, short, value_enum)]
        shell: Shell,
    },

    /// Launch the desktop application.
    ///
    /// Equivalent to running `deskmate` without any arguments.
    #[command(name = "--desktop", hide = true)]
    Desktop,
}

impl Cli {
    /// Returns the custom config path if specified via --config flag.
    #[must_use]
    pub fn config_path(&self) -> Option<PathBuf> { self.config.as_ref().map(PathBuf::from) }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub fn execute(&self) -> Result<(), DeskmateError> {
        if let Some(path) = self.config_path() {
            if !path.exists() {
                return Err(DeskmateError::ConfigError(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            config::set_custom_config_path(path);
        }

        match &self.command {
            Commands::Workspaces { json } => workspaces::execute(&open_store()?, *json),
            Commands::Completed(cmd) => history::execute_completed(&open_store()?, cmd),
            Commands::Session(cmd) => history::execute_session(&open_store()?, cmd),

            Commands::Schema => {
                println!("{}", schema::generate_schema_json());
                Ok(())
            }

            Commands::Completions { shell } => {
                Self::print_completions(*shell);
                Ok(())
            }

            Commands::Desktop => {
                // main.rs launches the app for --desktop before parsing
                unreachable!("Desktop mode should be handled by main.rs");
            }
        }
    }

    /// Print shell completions to stdout.
    fn print_completions<G: Generator>(generator: G) {
        let mut cmd = Self::command();
        generate(generator, &mut cmd, "deskmate", &mut io::stdout());
    }
}

fn open_store() -> Result<DataStore, DeskmateError> {
    let store = DataStore::open_default()?;
    tracing::debug!(path = %store.path().display(), "opened data file");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_version_format() {
        assert!(APP_VERSION.split('.').count() >= 2, "Version should have at least major.minor");
    }

    #[test]
    fn test_cli_parses_workspaces() {
        let cli = Cli::try_parse_from(["deskmate", "workspaces"]).unwrap();
        assert!(matches!(cli.command, Commands::Workspaces { json: false }));

        let cli = Cli::try_parse_from(["deskmate", "workspaces", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Workspaces { json: true }));
    }

    #[test]
    fn test_cli_parses_completed_list_and_clear() {
        let cli = Cli::try_parse_from(["deskmate", "completed", "list", "--json"]).unwrap();
        assert!(matches!(cli.command, Commands::Completed(CompletedCommands::List { json: true })));

        let cli = Cli::try_parse_from(["deskmate", "completed", "clear"]).unwrap();
        assert!(matches!(cli.command, Commands::Completed(CompletedCommands::Clear)));
    }

    #[test]
    fn test_cli_parses_session_commands() {
        let cli = Cli::try_parse_from(["deskmate", "session", "new"]).unwrap();
        assert!(matches!(cli.command, Commands::Session(SessionCommands::New)));

        let cli = Cli::try_parse_from(["deskmate", "session", "history"]).unwrap();
        assert!(matches!(cli.command, Commands::Session(SessionCommands::History { json: false })));

        let cli = Cli::try_parse_from(["deskmate", "session", "restore", "42", "3"]).unwrap();
        match cli.command {
            Commands::Session(SessionCommands::Restore { workspace, index }) => {
                assert_eq!(workspace, 42);
                assert_eq!(index, 3);
            }
            _ => panic!("Expected Session Restore command"),
        }
    }

    #[test]
    fn test_cli_parses_session_clear() {
        let cli = Cli::try_parse_from(["deskmate", "session", "clear"]).unwrap();
        assert!(matches!(cli.command, Commands::Session(SessionCommands::Clear { yes: false })));

        let cli = Cli::try_parse_from(["deskmate", "session", "clear", "--yes"]).unwrap();
        assert!(matches!(cli.command, Commands::Session(SessionCommands::Clear { yes: true })));
    }

    #[test]
    fn test_cli_rejects_restore_without_index() {
        assert!(Cli::try_parse_from(["deskmate", "session", "restore", "42"]).is_err());
    }

    #[test]
    fn test_cli_parses_schema() {
        let cli = Cli::try_parse_from(["deskmate", "schema"]).unwrap();
        assert!(matches!(cli.command, Commands::Schema));
    }

    #[test]
    fn test_cli_parses_completions() {
        let cli = Cli::try_parse_from(["deskmate", "completions", "--shell", "zsh"]).unwrap();
        match cli.command {
            Commands::Completions { shell } => assert_eq!(shell, Shell::Zsh),
            _ => panic!("Expected Completions command"),
        }
    }

    #[test]
    fn test_cli_parses_hidden_desktop_flag() {
        let cli = Cli::try_parse_from(["deskmate", "--desktop"]).unwrap();
        assert!(matches!(cli.command, Commands::Desktop));
    }

    #[test]
    fn test_cli_parses_config_flag_anywhere() {
        let cli = Cli::try_parse_from(["deskmate", "--config", "/tmp/deskmate.jsonc", "schema"]).unwrap();
        assert_eq!(cli.config_path(), Some(PathBuf::from("/tmp/deskmate.jsonc")));

        let cli = Cli::try_parse_from(["deskmate", "workspaces", "-c", "/tmp/deskmate.jsonc"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some("/tmp/deskmate.jsonc"));
    }

    #[test]
    fn test_cli_config_path_none_by_default() {
        let cli = Cli::try_parse_from(["deskmate", "schema"]).unwrap();
        assert!(cli.config_path().is_none());
    }

    #[test]
    fn test_execute_rejects_missing_config_file() {
        let cli = Cli::try_parse_from([
            "deskmate",
            "--config",
            "/nonexistent/deskmate/config.jsonc",
            "schema",
        ])
        .unwrap();
        assert!(matches!(cli.execute(), Err(DeskmateError::ConfigError(_))));
    }
}
