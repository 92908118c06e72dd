//! Recording fakes for the capability traits.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::bridge::{DesktopBridge, WindowBridge};
use crate::error::{BridgeError, BridgeResult};
use crate::geometry::{AnchorMode, MonitorBounds, Position, WindowSize};
use crate::types::{
    ActiveWorkspace, CompletedTask, DisplayGroup, TaskItem, WorkspaceId, default_color,
    workspace_name,
};

pub const MAIN_MONITOR: MonitorBounds = MonitorBounds {
    x: 0,
    y: 0,
    width: 1920,
    height: 1080,
    scale_factor: 1.0,
};

pub fn active(id: i64, position: u32) -> ActiveWorkspace {
    ActiveWorkspace {
        workspace_id: WorkspaceId(id),
        position,
        name: workspace_name(position),
        color: default_color(position).to_string(),
        is_fullscreen: false,
    }
}

// ============================================================================
// Desktop
// ============================================================================

#[derive(Debug, Default)]
pub struct DesktopState {
    pub active: HashMap<usize, ActiveWorkspace>,
    pub tasks: HashMap<WorkspaceId, Vec<TaskItem>>,
    pub titles: HashMap<WorkspaceId, String>,
    pub groups: Vec<DisplayGroup>,
    pub completed: Vec<CompletedTask>,
    pub anchors: HashMap<String, AnchorMode>,
    pub permitted: bool,
    pub fail_active: bool,
    pub fail_reads: bool,
    pub fail_writes: bool,
    /// Every call in order, e.g. `"save_tasks:2"`.
    pub calls: Vec<String>,
    pub switch_requests: Vec<(usize, WorkspaceId)>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeDesktop {
    state: Arc<Mutex<DesktopState>>,
}

impl FakeDesktop {
    pub fn new() -> Self {
        let fake = Self::default();
        fake.state().permitted = true;
        fake
    }

    pub fn state(&self) -> MutexGuard<'_, DesktopState> { self.state.lock() }

    pub fn set_active(&self, display_index: usize, workspace: ActiveWorkspace) {
        self.state().active.insert(display_index, workspace);
    }

    pub fn seed(&self, id: i64, title: &str, tasks: &[&str]) {
        let mut state = self.state();
        state.tasks.insert(WorkspaceId(id), tasks.iter().map(|t| TaskItem::new(*t)).collect());
        if !title.is_empty() {
            state.titles.insert(WorkspaceId(id), title.to_string());
        }
    }

    pub fn calls(&self) -> Vec<String> { self.state().calls.clone() }

    pub fn stored_tasks(&self, id: i64) -> Vec<TaskItem> {
        self.state().tasks.get(&WorkspaceId(id)).cloned().unwrap_or_default()
    }

    pub fn stored_title(&self, id: i64) -> Option<String> {
        self.state().titles.get(&WorkspaceId(id)).cloned()
    }

    fn record(&self, call: String) { self.state().calls.push(call); }

    fn write_guard(&self) -> BridgeResult<()> {
        if self.state().fail_writes {
            return Err(BridgeError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }

    fn read_guard(&self) -> BridgeResult<()> {
        if self.state().fail_reads {
            return Err(BridgeError::Unavailable("reads disabled".to_string()));
        }
        Ok(())
    }
}

impl DesktopBridge for FakeDesktop {
    fn active_workspace(&self, display_index: usize) -> BridgeResult<ActiveWorkspace> {
        self.record(format!("active_workspace:{display_index}"));
        let state = self.state();
        if state.fail_active {
            return Err(BridgeError::Unavailable("no connection".to_string()));
        }
        state
            .active
            .get(&display_index)
            .cloned()
            .ok_or_else(|| BridgeError::Unavailable(format!("display {display_index}")))
    }

    fn tasks(&self, workspace: WorkspaceId) -> BridgeResult<Vec<TaskItem>> {
        self.record(format!("tasks:{workspace}"));
        self.read_guard()?;
        Ok(self.state().tasks.get(&workspace).cloned().unwrap_or_default())
    }

    fn save_tasks(&self, workspace: WorkspaceId, tasks: &[TaskItem]) -> BridgeResult<()> {
        self.record(format!("save_tasks:{workspace}"));
        self.write_guard()?;
        self.state().tasks.insert(workspace, tasks.to_vec());
        Ok(())
    }

    fn title(&self, workspace: WorkspaceId) -> BridgeResult<String> {
        self.record(format!("title:{workspace}"));
        self.read_guard()?;
        Ok(self.state().titles.get(&workspace).cloned().unwrap_or_default())
    }

    fn save_title(&self, workspace: WorkspaceId, title: &str) -> BridgeResult<()> {
        self.record(format!("save_title:{workspace}"));
        self.write_guard()?;
        let mut state = self.state();
        if title.is_empty() {
            state.titles.remove(&workspace);
        } else {
            state.titles.insert(workspace, title.to_string());
        }
        Ok(())
    }

    fn workspaces_grouped(&self) -> BridgeResult<Vec<DisplayGroup>> {
        self.record("workspaces_grouped".to_string());
        self.read_guard()?;
        Ok(self.state().groups.clone())
    }

    fn switch_workspace(&self, display_index: usize, target: WorkspaceId) -> BridgeResult<bool> {
        self.record(format!("switch_workspace:{target}"));
        self.state().switch_requests.push((display_index, target));
        Ok(true)
    }

    fn switching_permitted(&self) -> bool { self.state().permitted }

    fn append_completed(&self, text: &str, workspace: WorkspaceId) -> BridgeResult<()> {
        self.record(format!("append_completed:{workspace}"));
        self.write_guard()?;
        let mut state = self.state();
        let id = state.completed.len().to_string();
        state.completed.push(CompletedTask {
            id,
            text: text.to_string(),
            workspace_id: workspace,
            completed_at: "2026-01-01T00:00:00+00:00".to_string(),
        });
        Ok(())
    }

    fn completed_tasks(&self) -> BridgeResult<Vec<CompletedTask>> {
        self.read_guard()?;
        Ok(self.state().completed.clone())
    }

    fn clear_completed(&self) -> BridgeResult<()> {
        self.write_guard()?;
        self.state().completed.clear();
        Ok(())
    }

    fn anchor_preference(&self, window_label: &str) -> Option<AnchorMode> {
        self.state().anchors.get(window_label).copied()
    }

    fn save_anchor_preference(&self, window_label: &str, mode: AnchorMode) -> BridgeResult<()> {
        self.write_guard()?;
        self.state().anchors.insert(window_label.to_string(), mode);
        Ok(())
    }
}

// ============================================================================
// Window
// ============================================================================

#[derive(Debug)]
pub struct WindowState {
    pub position: Position,
    pub size: WindowSize,
    pub monitors: Vec<MonitorBounds>,
    pub moves: Vec<Position>,
    pub resizes: Vec<WindowSize>,
    /// Accept move calls but leave the window where it is.
    pub ignore_moves: bool,
    pub fail: bool,
}

#[derive(Debug, Clone)]
pub struct FakeWindow {
    state: Arc<Mutex<WindowState>>,
}

impl FakeWindow {
    pub fn new(position: Position, size: WindowSize) -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState {
                position,
                size,
                monitors: vec![MAIN_MONITOR],
                moves: Vec::new(),
                resizes: Vec::new(),
                ignore_moves: false,
                fail: false,
            })),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, WindowState> { self.state.lock() }

    /// Simulates the user dragging the window.
    pub fn drag_to(&self, position: Position) { self.state().position = position; }

    pub fn position(&self) -> Position { self.state().position }

    pub fn size(&self) -> WindowSize { self.state().size }

    fn guard(&self) -> BridgeResult<()> {
        if self.state().fail {
            return Err(BridgeError::WindowNotFound("fake".to_string()));
        }
        Ok(())
    }
}

impl WindowBridge for FakeWindow {
    fn window_position(&self) -> BridgeResult<Position> {
        self.guard()?;
        Ok(self.state().position)
    }

    fn window_size(&self) -> BridgeResult<WindowSize> {
        self.guard()?;
        Ok(self.state().size)
    }

    fn move_window(&self, position: Position) -> BridgeResult<()> {
        self.guard()?;
        let mut state = self.state();
        state.moves.push(position);
        if !state.ignore_moves {
            state.position = position;
        }
        Ok(())
    }

    fn resize_window(&self, size: WindowSize) -> BridgeResult<()> {
        self.guard()?;
        let mut state = self.state();
        state.resizes.push(size);
        state.size = size;
        Ok(())
    }

    fn monitors(&self) -> BridgeResult<Vec<MonitorBounds>> {
        self.guard()?;
        Ok(self.state().monitors.clone())
    }
}
