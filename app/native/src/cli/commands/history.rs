//! `deskmate completed` and `deskmate session`: the completed-task log and
//! archived sessions.

use chrono::{DateTime, Local};
use clap::Subcommand;
use deskmate_core::WorkspaceId;
use deskmate_core::store::DataStore;
use deskmate_core::types::{CompletedTask, SavedContext};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::error::DeskmateError;

/// Completed-task log commands.
#[derive(Subcommand, Debug)]
pub enum CompletedCommands {
    /// List completed tasks, oldest first.
    List {
        /// Output as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Delete the completed-task log.
    Clear,
}

/// Session archive commands.
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Archive every desktop's notes and start from empty lists.
    New,

    /// List archived sessions per desktop.
    History {
        /// Output as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Restore an archived session onto its desktop.
    ///
    /// Replaces the desktop's current title and tasks. Indexes are shown by
    /// `deskmate session history`.
    Restore {
        /// Desktop ID.
        workspace: i64,
        /// Index in the desktop's history, oldest first.
        index: usize,
    },

    /// Delete every desktop's title, tasks and custom color.
    ///
    /// Archived sessions and the completed-task log are kept.
    Clear {
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Tabled)]
struct CompletedRow {
    #[tabled(rename = "Completed")]
    completed_at: String,
    #[tabled(rename = "Desktop")]
    workspace: i64,
    #[tabled(rename = "Task")]
    text: String,
}

#[derive(Tabled)]
struct ContextRow {
    #[tabled(rename = "Desktop")]
    workspace: i64,
    #[tabled(rename = "Index")]
    index: usize,
    #[tabled(rename = "Saved")]
    saved_at: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Tasks")]
    tasks: usize,
}

/// Formats an RFC 3339 timestamp in local time, or returns it unchanged.
fn local_time(rfc3339: &str) -> String {
    DateTime::parse_from_rfc3339(rfc3339).map_or_else(
        |_| rfc3339.to_string(),
        |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
    )
}

fn completed_rows(entries: &[CompletedTask]) -> Vec<CompletedRow> {
    entries
        .iter()
        .map(|entry| CompletedRow {
            completed_at: local_time(&entry.completed_at),
            workspace: entry.workspace_id.0,
            text: output::truncate(&entry.text, 48),
        })
        .collect()
}

fn context_rows<'a>(
    history: impl IntoIterator<Item = (&'a WorkspaceId, &'a Vec<SavedContext>)>,
) -> Vec<ContextRow> {
    history
        .into_iter()
        .flat_map(|(id, contexts)| {
            contexts.iter().enumerate().map(move |(index, context)| ContextRow {
                workspace: id.0,
                index,
                saved_at: local_time(&context.saved_at),
                title: output::format_title(&context.title, 32),
                tasks: context.tasks.len(),
            })
        })
        .collect()
}

/// # Errors
///
/// Returns an error if the data file cannot be written.
pub fn execute_completed(store: &DataStore, cmd: &CompletedCommands) -> Result<(), DeskmateError> {
    match cmd {
        CompletedCommands::List { json } => {
            let entries = store.completed();
            if *json {
                return output::print_json(&entries);
            }
            if entries.is_empty() {
                println!("No completed tasks.");
            } else {
                println!("{}", Table::new(completed_rows(&entries)).with(Style::rounded()));
            }
            Ok(())
        }
        CompletedCommands::Clear => {
            let cleared = store.clear_completed()?;
            println!("Cleared {cleared} completed tasks.");
            Ok(())
        }
    }
}

/// # Errors
///
/// Returns an error if the data file cannot be written or the archived
/// session does not exist.
pub fn execute_session(store: &DataStore, cmd: &SessionCommands) -> Result<(), DeskmateError> {
    match cmd {
        SessionCommands::New => {
            let archived = store.start_new_session(chrono::Utc::now())?;
            println!("Archived {archived} desktops. Running widgets pick this up on their next reload.");
            Ok(())
        }
        SessionCommands::History { json } => {
            let history = store.context_history();
            if *json {
                return output::print_json(&history);
            }
            let rows = context_rows(&history);
            if rows.is_empty() {
                println!("No archived sessions.");
            } else {
                println!("{}", Table::new(rows).with(Style::rounded()));
            }
            Ok(())
        }
        SessionCommands::Restore { workspace, index } => {
            let restored = store.restore_context(WorkspaceId(*workspace), *index)?;
            println!(
                "Restored {} tasks to desktop {workspace} ({}).",
                restored.tasks.len(),
                local_time(&restored.saved_at)
            );
            Ok(())
        }
        SessionCommands::Clear { yes: false } => {
            println!("This deletes the notes and colors of every desktop. Re-run with --yes to confirm.");
            Ok(())
        }
        SessionCommands::Clear { yes: true } => {
            let cleared = store.clear_all()?;
            println!("Cleared {cleared} desktops. Running widgets pick this up on their next reload.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::{TimeZone, Utc};
    use deskmate_core::TaskItem;

    use super::*;

    fn store() -> (tempfile::TempDir, DataStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::open(dir.path().join("data.json"));
        (dir, store)
    }

    #[test]
    fn test_local_time_passes_through_garbage() {
        assert_eq!(local_time("yesterday"), "yesterday");
        assert_eq!(local_time("2026-04-02T08:00:00+00:00").len(), "2026-04-02 08:00".len());
    }

    #[test]
    fn test_completed_rows_truncate_text() {
        let entry = CompletedTask {
            id: "1".to_string(),
            text: "x".repeat(60),
            workspace_id: WorkspaceId(3),
            completed_at: "2026-04-02T08:00:00+00:00".to_string(),
        };
        let rows = completed_rows(&[entry]);
        assert_eq!(rows[0].workspace, 3);
        assert_eq!(rows[0].text.chars().count(), 48);
    }

    #[test]
    fn test_context_rows_index_per_workspace() {
        let context = |title: &str| SavedContext {
            title: title.to_string(),
            tasks: vec![TaskItem::new("a")],
            saved_at: "2026-04-02T08:00:00+00:00".to_string(),
        };
        let mut history = BTreeMap::new();
        history.insert(WorkspaceId(1), vec![context("Mon"), context("Tue")]);
        history.insert(WorkspaceId(2), vec![context("Wed")]);

        let rows = context_rows(&history);
        let indexes: Vec<(i64, usize)> = rows.iter().map(|r| (r.workspace, r.index)).collect();
        assert_eq!(indexes, vec![(1, 0), (1, 1), (2, 0)]);
    }

    #[test]
    fn test_session_new_then_restore() {
        let (_dir, store) = store();
        store.save_title(WorkspaceId(4), "Sprint").unwrap();
        store.save_tasks(WorkspaceId(4), &[TaskItem::new("review")]).unwrap();

        execute_session(&store, &SessionCommands::New).unwrap();
        assert!(store.title(WorkspaceId(4)).is_empty());

        execute_session(&store, &SessionCommands::Restore { workspace: 4, index: 0 }).unwrap();
        assert_eq!(store.title(WorkspaceId(4)), "Sprint");
        assert_eq!(store.tasks(WorkspaceId(4)).len(), 1);
    }

    #[test]
    fn test_session_clear_needs_confirmation() {
        let (_dir, store) = store();
        store.save_title(WorkspaceId(4), "Sprint").unwrap();
        store.set_custom_color(WorkspaceId(4), Some("#112233")).unwrap();

        execute_session(&store, &SessionCommands::Clear { yes: false }).unwrap();
        assert_eq!(store.title(WorkspaceId(4)), "Sprint");

        execute_session(&store, &SessionCommands::Clear { yes: true }).unwrap();
        assert!(store.title(WorkspaceId(4)).is_empty());
        assert_eq!(store.custom_color(WorkspaceId(4)), None);
    }

    #[test]
    fn test_restore_unknown_index_fails() {
        let (_dir, store) = store();
        let result = execute_session(&store, &SessionCommands::Restore { workspace: 4, index: 2 });
        assert!(matches!(result, Err(DeskmateError::StoreError(_))));
    }

    #[test]
    fn test_completed_clear() {
        let (_dir, store) = store();
        let at = Utc.with_ymd_and_hms(2026, 4, 2, 8, 0, 0).unwrap();
        store.append_completed("ship", WorkspaceId(1), at).unwrap();

        execute_completed(&store, &CompletedCommands::Clear).unwrap();
        assert!(store.completed().is_empty());
    }
}
