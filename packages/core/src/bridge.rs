//! Platform capabilities the engine depends on.
//!
//! The widget session never talks to the OS directly. It is handed one
//! `DesktopBridge` (desktop queries and the data store) and one
//! `WindowBridge` (its own window) at construction time. The app crate
//! implements both on top of macOS and Tauri; tests use recording fakes.
//!
//! All calls are synchronous and may fail. Callers treat failures as
//! transient.

use crate::error::BridgeResult;
use crate::geometry::{AnchorMode, MonitorBounds, Position, WindowSize};
use crate::types::{ActiveWorkspace, CompletedTask, DisplayGroup, TaskItem, WorkspaceId};

/// Desktop queries and per-desktop persistence.
pub trait DesktopBridge {
    /// Returns the desktop currently shown on the display at `display_index`.
    fn active_workspace(&self, display_index: usize) -> BridgeResult<ActiveWorkspace>;

    fn tasks(&self, workspace: WorkspaceId) -> BridgeResult<Vec<TaskItem>>;

    fn save_tasks(&self, workspace: WorkspaceId, tasks: &[TaskItem]) -> BridgeResult<()>;

    fn title(&self, workspace: WorkspaceId) -> BridgeResult<String>;

    /// Persists a title. An empty title removes the stored entry.
    fn save_title(&self, workspace: WorkspaceId, title: &str) -> BridgeResult<()>;

    /// Lists normal desktops grouped by display, with stored titles and counts.
    fn workspaces_grouped(&self) -> BridgeResult<Vec<DisplayGroup>>;

    /// Asks the OS to show `target` on the display at `display_index`.
    ///
    /// Returns `false` if the OS had nothing to do (already active).
    fn switch_workspace(&self, display_index: usize, target: WorkspaceId) -> BridgeResult<bool>;

    /// Whether `switch_workspace` is currently permitted.
    fn switching_permitted(&self) -> bool;

    fn append_completed(&self, text: &str, workspace: WorkspaceId) -> BridgeResult<()>;

    fn completed_tasks(&self) -> BridgeResult<Vec<CompletedTask>>;

    fn clear_completed(&self) -> BridgeResult<()>;

    /// Anchor preference stored for a window label.
    fn anchor_preference(&self, window_label: &str) -> Option<AnchorMode>;

    fn save_anchor_preference(&self, window_label: &str, mode: AnchorMode) -> BridgeResult<()>;
}

/// Geometry of the widget's own window.
pub trait WindowBridge {
    fn window_position(&self) -> BridgeResult<Position>;

    fn window_size(&self) -> BridgeResult<WindowSize>;

    fn move_window(&self, position: Position) -> BridgeResult<()>;

    fn resize_window(&self, size: WindowSize) -> BridgeResult<()>;

    /// All monitors, indexed by display index.
    fn monitors(&self) -> BridgeResult<Vec<MonitorBounds>>;
}
