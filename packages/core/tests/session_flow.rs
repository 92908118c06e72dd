//! End-to-end flows of a widget session backed by the real data file.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{TimeZone, Utc};
use deskmate_core::store::DataStore;
use deskmate_core::types::{CompletedTask, DisplayGroup, default_color, workspace_name};
use deskmate_core::{
    ActiveWorkspace, AnchorMode, BridgeError, BridgeResult, DesktopBridge, MonitorBounds, Position,
    SessionOptions, TaskItem, WidgetSession, WindowBridge, WindowSize, WorkspaceId,
};

// ============================================================================
// Bridges
// ============================================================================

#[derive(Clone)]
struct StoreDesktop {
    store: Arc<DataStore>,
    active: Rc<RefCell<HashMap<usize, i64>>>,
}

impl StoreDesktop {
    fn new(store: Arc<DataStore>) -> Self {
        Self {
            store,
            active: Rc::default(),
        }
    }

    fn show(&self, display_index: usize, id: i64) { self.active.borrow_mut().insert(display_index, id); }
}

impl DesktopBridge for StoreDesktop {
    fn active_workspace(&self, display_index: usize) -> BridgeResult<ActiveWorkspace> {
        let id = *self
            .active
            .borrow()
            .get(&display_index)
            .ok_or_else(|| BridgeError::Unavailable("no desktop".to_string()))?;
        let position = u32::try_from(id - 1).unwrap_or(0);
        Ok(ActiveWorkspace {
            workspace_id: WorkspaceId(id),
            position,
            name: workspace_name(position),
            color: default_color(position).to_string(),
            is_fullscreen: false,
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

    fn workspaces_grouped(&self) -> BridgeResult<Vec<DisplayGroup>> { Ok(Vec::new()) }

    fn switch_workspace(&self, display_index: usize, target: WorkspaceId) -> BridgeResult<bool> {
        self.show(display_index, target.0);
        Ok(true)
    }

    fn switching_permitted(&self) -> bool { true }

    fn append_completed(&self, text: &str, workspace: WorkspaceId) -> BridgeResult<()> {
        let at = Utc.with_ymd_and_hms(2026, 4, 2, 8, 0, 0).unwrap();
        self.store.append_completed(text, workspace, at)?;
        Ok(())
    }

    fn completed_tasks(&self) -> BridgeResult<Vec<CompletedTask>> { Ok(self.store.completed()) }

    fn clear_completed(&self) -> BridgeResult<()> {
        self.store.clear_completed()?;
        Ok(())
    }

    fn anchor_preference(&self, window_label: &str) -> Option<AnchorMode> { self.store.anchor(window_label) }

    fn save_anchor_preference(&self, window_label: &str, mode: AnchorMode) -> BridgeResult<()> {
        Ok(self.store.save_anchor(window_label, mode)?)
    }
}

#[derive(Clone)]
struct Window {
    frame: Rc<RefCell<(Position, WindowSize)>>,
}

impl Window {
    fn new() -> Self {
        Self {
            frame: Rc::new(RefCell::new((Position::new(400, 400), WindowSize::new(580, 904)))),
        }
    }

    fn position(&self) -> Position { self.frame.borrow().0 }

    fn drag_to(&self, position: Position) { self.frame.borrow_mut().0 = position; }
}

// A Retina display: logical 1512x982 at 2x.
const RETINA: MonitorBounds = MonitorBounds {
    x: 0,
    y: 0,
    width: 3024,
    height: 1964,
    scale_factor: 2.0,
};

impl WindowBridge for Window {
    fn window_position(&self) -> BridgeResult<Position> { Ok(self.frame.borrow().0) }

    fn window_size(&self) -> BridgeResult<WindowSize> { Ok(self.frame.borrow().1) }

    fn move_window(&self, position: Position) -> BridgeResult<()> {
        self.frame.borrow_mut().0 = position;
        Ok(())
    }

    fn resize_window(&self, size: WindowSize) -> BridgeResult<()> {
        self.frame.borrow_mut().1 = size;
        Ok(())
    }

    fn monitors(&self) -> BridgeResult<Vec<MonitorBounds>> { Ok(vec![RETINA]) }
}

// ============================================================================
// Flows
// ============================================================================

const TICK: Duration = Duration::from_millis(200);

fn session(desktop: &StoreDesktop, window: &Window) -> WidgetSession<StoreDesktop, Window> {
    WidgetSession::new(
        "main",
        0,
        desktop.clone(),
        window.clone(),
        SessionOptions::default(),
        Vec::new(),
    )
}

#[test]
fn test_edits_reach_the_data_file_after_the_save_delay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.json");
    let desktop = StoreDesktop::new(Arc::new(DataStore::open(&path)));
    desktop.show(0, 1);
    let window = Window::new();
    let mut widget = session(&desktop, &window);
    let start = Instant::now();

    widget.activate();
    widget.tick(start);
    widget.update_title("Deep work", start);
    widget.add_task("outline chapter", start);

    widget.tick(start + TICK);
    assert!(DataStore::open(&path).title(WorkspaceId(1)).is_empty());

    widget.tick(start + TICK * 2);
    let reopened = DataStore::open(&path);
    assert_eq!(reopened.title(WorkspaceId(1)), "Deep work");
    assert_eq!(reopened.tasks(WorkspaceId(1))[0].text, "outline chapter");
}

#[test]
fn test_switching_desktops_keeps_each_desktops_notes() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DataStore::open(dir.path().join("notes.json")));
    let desktop = StoreDesktop::new(Arc::clone(&store));
    desktop.show(0, 1);
    let window = Window::new();
    let mut widget = session(&desktop, &window);
    let mut now = Instant::now();

    widget.activate();
    widget.tick(now);
    widget.update_title("One", now);

    widget.switch_workspace(WorkspaceId(2)).unwrap();
    now += TICK;
    widget.tick(now);
    assert_eq!(store.title(WorkspaceId(1)), "One");
    assert_eq!(widget.snapshot().title, "");

    widget.update_title("Two", now);
    desktop.show(0, 1);
    now += TICK;
    widget.tick(now);
    assert_eq!(widget.snapshot().title, "One");
    assert_eq!(store.title(WorkspaceId(2)), "Two");
}

#[test]
fn test_snap_uses_physical_pixels_and_drag_is_remembered() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DataStore::open(dir.path().join("notes.json")));
    let desktop = StoreDesktop::new(Arc::clone(&store));
    desktop.show(0, 1);
    let window = Window::new();
    let mut widget = session(&desktop, &window);
    let now = Instant::now();

    widget.activate();
    widget.tick(now);
    // Right edge minus width minus 16pt padding, 25pt below the top.
    assert_eq!(window.position(), Position::new(3024 - 580 - 32, 50));

    widget.tick(now + TICK);
    window.drag_to(Position::new(900, 700));
    widget.tick(now + TICK * 2);
    assert_eq!(store.anchor("main"), Some(AnchorMode::Free));

    // A fresh session picks the free mode back up and leaves the window alone.
    let mut restarted = session(&desktop, &window);
    restarted.activate();
    restarted.tick(now + TICK * 3);
    assert_eq!(window.position(), Position::new(900, 700));
}

#[test]
fn test_new_session_archives_and_reload_clears_widget() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DataStore::open(dir.path().join("notes.json")));
    let desktop = StoreDesktop::new(Arc::clone(&store));
    desktop.show(0, 1);
    let window = Window::new();
    let mut widget = session(&desktop, &window);
    let now = Instant::now();

    widget.activate();
    widget.tick(now);
    widget.update_title("Sprint", now);
    widget.add_task("ship", now);
    widget.flush_all();

    let archived = store.start_new_session(Utc.with_ymd_and_hms(2026, 4, 2, 18, 0, 0).unwrap()).unwrap();
    assert_eq!(archived, 1);
    widget.reload();
    assert_eq!(widget.snapshot().title, "");
    assert!(widget.snapshot().tasks.is_empty());

    store.restore_context(WorkspaceId(1), 0).unwrap();
    widget.reload();
    assert_eq!(widget.snapshot().title, "Sprint");
}

#[test]
fn test_completing_a_task_logs_it() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(DataStore::open(dir.path().join("notes.json")));
    let desktop = StoreDesktop::new(Arc::clone(&store));
    desktop.show(0, 3);
    let window = Window::new();
    let mut widget = session(&desktop, &window);
    let now = Instant::now();

    widget.activate();
    widget.tick(now);
    widget.add_task("review PR", now);
    let id = widget.snapshot().tasks[0].id.clone();
    widget.toggle_task(&id, now);

    let completed = widget.completed_tasks().unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].workspace_id, WorkspaceId(3));
    assert!(completed[0].completed_at.starts_with("2026-04-02T08:00:00"));

    widget.clear_completed().unwrap();
    assert!(store.completed().is_empty());
}
