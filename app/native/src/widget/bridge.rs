//! macOS and Tauri implementations of the engine's platform bridges.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;

use chrono::Utc;
use deskmate_core::store::DataStore;
use deskmate_core::types::{
    CompletedTask, DisplayGroup, WorkspaceSummary, default_color, workspace_name,
};
use deskmate_core::{
    ActiveWorkspace, AnchorMode, BridgeError, BridgeResult, DesktopBridge, MonitorBounds, Position,
    TaskItem, WindowBridge, WindowSize, WorkspaceId,
};
use tauri::{PhysicalPosition, PhysicalSize, WebviewWindow};

use crate::platform::spaces::{self, DesktopEntry, DisplaySpaces};
use crate::platform::{accessibility, keyboard};

// ============================================================================
// Desktop bridge
// ============================================================================

/// Desktop queries through the window server, persistence through the data file.
#[derive(Clone)]
pub struct NativeDesktop {
    store: Arc<DataStore>,
}

impl NativeDesktop {
    #[must_use]
    pub const fn new(store: Arc<DataStore>) -> Self { Self { store } }

    fn layout() -> BridgeResult<Vec<DisplaySpaces>> {
        spaces::managed_display_spaces()
            .ok_or_else(|| BridgeError::Unavailable("window server connection".to_string()))
    }

    fn color(&self, id: WorkspaceId, position: u32) -> String {
        self.store.custom_color(id).unwrap_or_else(|| default_color(position).to_string())
    }
}

/// Builds the overview rows for every normal desktop, grouped by display.
#[must_use]
pub fn group_workspaces(desktops: &[DesktopEntry], store: &DataStore) -> Vec<DisplayGroup> {
    let mut groups: BTreeMap<usize, Vec<WorkspaceSummary>> = BTreeMap::new();

    for desktop in desktops {
        let id = WorkspaceId(desktop.id);
        groups.entry(desktop.display_index).or_default().push(WorkspaceSummary {
            workspace_id: id,
            position: desktop.position,
            name: workspace_name(desktop.position),
            title: store.title(id),
            color: store
                .custom_color(id)
                .unwrap_or_else(|| default_color(desktop.position).to_string()),
            task_count: store.open_task_count(id),
        });
    }

    groups
        .into_iter()
        .map(|(display_index, workspaces)| DisplayGroup { display_index, workspaces })
        .collect()
}

impl DesktopBridge for NativeDesktop {
    fn active_workspace(&self, display_index: usize) -> BridgeResult<ActiveWorkspace> {
        let layout = Self::layout()?;
        let space = spaces::current_space(&layout, display_index).ok_or_else(|| {
            BridgeError::Unavailable(format!("no current space on display {display_index}"))
        })?;
        let position = spaces::position_of(&spaces::normal_desktops(&layout), space.id).unwrap_or(0);
        let id = WorkspaceId(space.id);

        Ok(ActiveWorkspace {
            workspace_id: id,
            position,
            name: workspace_name(position),
            color: self.color(id, position),
            is_fullscreen: !space.is_normal(),
        })
    }

    fn tasks(&self, workspace: WorkspaceId) -> BridgeResult<Vec<TaskItem>> { Ok(self.store.tasks(workspace)) }

    fn save_tasks(&self, workspace: WorkspaceId, tasks: &[TaskItem]) -> BridgeResult<()> {
        Ok(self.store.save_tasks(workspace, tasks)?)
    }

    fn title(&self, workspace: WorkspaceId) -> BridgeResult<String> { Ok(self.store.title(workspace)) }

    fn save_title(&self, workspace: WorkspaceId, title: &str) -> BridgeResult<()> {
        Ok(self.store.save_title(workspace, title)?)
    }

    fn workspaces_grouped(&self) -> BridgeResult<Vec<DisplayGroup>> {
        let desktops = spaces::normal_desktops(&Self::layout()?);
        Ok(group_workspaces(&desktops, &self.store))
    }

    fn switch_workspace(&self, display_index: usize, target: WorkspaceId) -> BridgeResult<bool> {
        let layout = Self::layout()?;
        let display = if display_index < layout.len() { display_index } else { 0 };
        let current = spaces::current_space(&layout, display)
            .ok_or_else(|| BridgeError::Unavailable(format!("no current space on display {display}")))?;

        let desktops = spaces::normal_desktops(&layout);
        let steps = spaces::switch_steps(&desktops, display, current.id, target.0).ok_or_else(|| {
            BridgeError::UnknownWorkspace(format!("{target} is not a desktop of display {display}"))
        })?;
        if steps == 0 {
            return Ok(false);
        }

        // The presses take `steps * 300ms`; never hold the caller for that long.
        thread::spawn(move || {
            if let Err(err) = keyboard::move_desktops(steps) {
                tracing::warn!(error = %err, steps, "desktop switch key presses failed");
            }
        });
        Ok(true)
    }

    fn switching_permitted(&self) -> bool { accessibility::is_trusted() }

    fn append_completed(&self, text: &str, workspace: WorkspaceId) -> BridgeResult<()> {
        self.store.append_completed(text, workspace, Utc::now())?;
        Ok(())
    }

    fn completed_tasks(&self) -> BridgeResult<Vec<CompletedTask>> { Ok(self.store.completed()) }

    fn clear_completed(&self) -> BridgeResult<()> {
        let cleared = self.store.clear_completed()?;
        tracing::debug!(cleared, "cleared completed tasks");
        Ok(())
    }

    fn anchor_preference(&self, window_label: &str) -> Option<AnchorMode> { self.store.anchor(window_label) }

    fn save_anchor_preference(&self, window_label: &str, mode: AnchorMode) -> BridgeResult<()> {
        Ok(self.store.save_anchor(window_label, mode)?)
    }
}

// ============================================================================
// Window bridge
// ============================================================================

/// A widget's own Tauri window. All geometry is in physical pixels.
#[derive(Clone)]
pub struct TauriWindow {
    window: WebviewWindow,
}

impl TauriWindow {
    #[must_use]
    pub const fn new(window: WebviewWindow) -> Self { Self { window } }
}

fn window_error(err: tauri::Error) -> BridgeError {
    match err {
        tauri::Error::WindowNotFound | tauri::Error::WebviewNotFound => {
            BridgeError::WindowNotFound(err.to_string())
        }
        other => BridgeError::Unavailable(other.to_string()),
    }
}

impl WindowBridge for TauriWindow {
    fn window_position(&self) -> BridgeResult<Position> {
        let position = self.window.outer_position().map_err(window_error)?;
        Ok(Position::new(position.x, position.y))
    }

    fn window_size(&self) -> BridgeResult<WindowSize> {
        let size = self.window.outer_size().map_err(window_error)?;
        Ok(WindowSize::new(size.width, size.height))
    }

    fn move_window(&self, position: Position) -> BridgeResult<()> {
        self.window
            .set_position(PhysicalPosition::new(position.x, position.y))
            .map_err(window_error)
    }

    fn resize_window(&self, size: WindowSize) -> BridgeResult<()> {
        self.window.set_size(PhysicalSize::new(size.width, size.height)).map_err(window_error)
    }

    fn monitors(&self) -> BridgeResult<Vec<MonitorBounds>> {
        let monitors = self.window.available_monitors().map_err(window_error)?;
        Ok(monitors
            .iter()
            .map(|monitor| MonitorBounds {
                x: monitor.position().x,
                y: monitor.position().y,
                width: monitor.size().width,
                height: monitor.size().height,
                scale_factor: monitor.scale_factor(),
            })
            .collect())
    }
}
