//! `deskmate workspaces`: stored notes per desktop.

use deskmate_core::WorkspaceId;
use deskmate_core::store::DataStore;
use deskmate_core::types::{default_color, workspace_name};
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::error::DeskmateError;
use crate::platform::spaces::{self, DesktopEntry};

/// One desktop with stored notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceOverview {
    pub workspace_id: WorkspaceId,
    /// `None` when the desktop no longer exists (or desktops are unavailable).
    pub name: Option<String>,
    pub display_index: Option<usize>,
    pub title: String,
    pub open_tasks: usize,
    pub total_tasks: usize,
    pub color: Option<String>,
}

#[derive(Tabled)]
struct WorkspaceRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Desktop")]
    name: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Open")]
    open: usize,
    #[tabled(rename = "Total")]
    total: usize,
    #[tabled(rename = "Color")]
    color: String,
}

/// Builds the overview of every workspace known to the store.
///
/// `desktops` are the live desktops; stored workspaces that are not among
/// them are listed without a name.
#[must_use]
pub fn overview(store: &DataStore, desktops: &[DesktopEntry]) -> Vec<WorkspaceOverview> {
    store
        .known_workspaces()
        .into_iter()
        .map(|id| {
            let live = desktops.iter().find(|d| d.id == id.0);
            let tasks = store.tasks(id);
            WorkspaceOverview {
                workspace_id: id,
                name: live.map(|d| workspace_name(d.position)),
                display_index: live.map(|d| d.display_index),
                title: store.title(id),
                open_tasks: tasks.iter().filter(|t| !t.done).count(),
                total_tasks: tasks.len(),
                color: store
                    .custom_color(id)
                    .or_else(|| live.map(|d| default_color(d.position).to_string())),
            }
        })
        .collect()
}

/// # Errors
///
/// Returns an error if JSON output fails.
pub fn execute(store: &DataStore, json: bool) -> Result<(), DeskmateError> {
    let desktops = spaces::managed_display_spaces()
        .map(|layout| spaces::normal_desktops(&layout))
        .unwrap_or_default();
    let workspaces = overview(store, &desktops);

    if json {
        return output::print_json(&workspaces);
    }
    if workspaces.is_empty() {
        println!("No desktops have notes yet.");
        return Ok(());
    }

    let rows: Vec<WorkspaceRow> = workspaces
        .iter()
        .map(|w| WorkspaceRow {
            id: w.workspace_id.0,
            name: w.name.clone().unwrap_or_else(|| "-".to_string()),
            title: output::format_title(&w.title, 32),
            open: w.open_tasks,
            total: w.total_tasks,
            color: w.color.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use deskmate_core::TaskItem;

    use super::*;

    #[test]
    fn test_overview_marks_missing_desktops() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::open(dir.path().join("data.json"));
        store.save_title(WorkspaceId(5), "Planning").unwrap();
        store
            .save_tasks(WorkspaceId(9), &[TaskItem::new("a"), TaskItem {
                done: true,
                ..TaskItem::new("b")
            }])
            .unwrap();

        let desktops = [DesktopEntry {
            id: 5,
            display_index: 0,
            position: 1,
        }];
        let rows = overview(&store, &desktops);

        assert_eq!(rows.len(), 2);
        let planning = rows.iter().find(|r| r.workspace_id == WorkspaceId(5)).unwrap();
        assert_eq!(planning.name.as_deref(), Some("Desktop 2"));
        assert_eq!(planning.color.as_deref(), Some(default_color(1)));

        let gone = rows.iter().find(|r| r.workspace_id == WorkspaceId(9)).unwrap();
        assert_eq!(gone.name, None);
        assert_eq!(gone.open_tasks, 1);
        assert_eq!(gone.total_tasks, 2);
        assert_eq!(gone.color, None);
    }

    #[test]
    fn test_overview_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = DataStore::open(dir.path().join("data.json"));
        assert!(overview(&store, &[]).is_empty());
    }
}
