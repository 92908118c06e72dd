//! Shared data types for workspaces and tasks.
//!
//! These types cross every boundary of the crate: they are cached in memory,
//! written to the data store, and serialized to the web view.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Muted palette used for desktops without a custom color.
pub const DEFAULT_COLORS: [&str; 8] = [
    "#F5E6A3", "#F2B8A0", "#A8CCE0", "#A8D8B0", "#C8A8D8", "#F0C8A0", "#A0D8D0", "#E0B8C8",
];

/// Returns the palette color for a desktop position.
#[must_use]
pub const fn default_color(position: u32) -> &'static str {
    DEFAULT_COLORS[position as usize % DEFAULT_COLORS.len()]
}

/// Returns the display name of the desktop at a zero-based position.
#[must_use]
pub fn workspace_name(position: u32) -> String { format!("Desktop {}", position + 1) }

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque identifier of a virtual desktop, as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(pub i64);

impl fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl From<i64> for WorkspaceId {
    fn from(id: i64) -> Self { Self(id) }
}

// ============================================================================
// Tasks
// ============================================================================

/// A single to-do entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub done: bool,
}

impl TaskItem {
    /// Creates an open task with a fresh time-ordered id.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            text: text.into(),
            done: false,
        }
    }
}

/// Everything the widget shows for one desktop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub title: String,
    pub tasks: Vec<TaskItem>,
}

impl WorkspaceRecord {
    /// Number of tasks that are not done yet.
    #[must_use]
    pub fn active_count(&self) -> usize { self.tasks.iter().filter(|t| !t.done).count() }
}

// ============================================================================
// Workspace descriptors
// ============================================================================

/// The desktop currently shown on one display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveWorkspace {
    pub workspace_id: WorkspaceId,
    /// Zero-based position across all displays.
    pub position: u32,
    pub name: String,
    pub color: String,
    pub is_fullscreen: bool,
}

/// One row of the cross-desktop overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSummary {
    pub workspace_id: WorkspaceId,
    pub position: u32,
    pub name: String,
    pub title: String,
    pub color: String,
    /// Open (not done) tasks only.
    pub task_count: usize,
}

/// Overview rows for the desktops of one display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayGroup {
    pub display_index: usize,
    pub workspaces: Vec<WorkspaceSummary>,
}

// ============================================================================
// History
// ============================================================================

/// An entry of the append-only completed-task log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub id: String,
    pub text: String,
    pub workspace_id: WorkspaceId,
    /// RFC 3339 timestamp.
    pub completed_at: String,
}

/// An archived title and task list from a previous session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedContext {
    pub title: String,
    pub tasks: Vec<TaskItem>,
    /// RFC 3339 timestamp.
    pub saved_at: String,
}
