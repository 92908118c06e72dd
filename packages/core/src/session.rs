//! One widget window's state, wired to its platform bridges.
//!
//! A session owns the workspace cache and the drift, collapse and switch
//! controllers for a single window. Both bridges are handed in at
//! construction; nothing here reaches for global state.
//!
//! `tick` is the body of the poll loop. It runs three independent steps
//! (desktop check, due writes, geometry check) and a failure in one never
//! stops the others. User operations are plain methods that take `now`.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::bridge::{DesktopBridge, WindowBridge};
use crate::collapse::{CollapseController, PanelKind, PanelLayout, compensated_position};
use crate::config::DeskmateConfig;
use crate::drift::{DriftAction, DriftController, WindowSample};
use crate::error::{BridgeError, BridgeResult};
use crate::geometry::{Anchor, AnchorMode, Position, SnapInsets};
use crate::switcher::{SwitchOutcome, WorkspaceSwitcher};
use crate::types::{ActiveWorkspace, CompletedTask, DisplayGroup, TaskItem, WorkspaceId};
use crate::workspace::{TaskEdit, WorkspaceCache};

/// Tunables for a session, usually taken from the configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionOptions {
    pub save_delay: Duration,
    pub snap_settle: Duration,
    pub layout: PanelLayout,
    pub insets: SnapInsets,
    pub default_anchor: Anchor,
}

impl Default for SessionOptions {
    fn default() -> Self { Self::from(&DeskmateConfig::default()) }
}

impl From<&DeskmateConfig> for SessionOptions {
    fn from(config: &DeskmateConfig) -> Self {
        Self {
            save_delay: config.polling.save_delay(),
            snap_settle: config.polling.snap_settle(),
            layout: config.widget.layout(),
            insets: config.widget.insets(),
            default_anchor: config.widget.default_anchor,
        }
    }
}

/// Everything the web view renders for one window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSnapshot {
    pub window_label: String,
    pub display_index: usize,
    pub workspace: Option<ActiveWorkspace>,
    pub title: String,
    pub tasks: Vec<TaskItem>,
    pub anchor: AnchorMode,
    /// The anchor "snap back" returns to.
    pub last_anchor: Anchor,
    pub off_monitor: bool,
    pub collapsed: bool,
    pub hidden_panels: Vec<PanelKind>,
    pub can_switch: bool,
    pub main_view_active: bool,
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub workspace: SwitchOutcome,
    pub drift: DriftAction,
    pub collapse_changed: bool,
    pub flushed: usize,
}

pub struct WidgetSession<D, W> {
    label: String,
    desktop: D,
    window: W,
    cache: WorkspaceCache,
    drift: DriftController,
    collapse: CollapseController,
    switcher: WorkspaceSwitcher,
    main_view_active: bool,
}

impl<D: DesktopBridge, W: WindowBridge> WidgetSession<D, W> {
    /// Creates a session for the window `label` bound to `display_index`.
    ///
    /// The anchor preference is read from `desktop` for this label.
    pub fn new(
        label: impl Into<String>,
        display_index: usize,
        desktop: D,
        window: W,
        options: SessionOptions,
        hidden_panels: impl IntoIterator<Item = PanelKind>,
    ) -> Self {
        let label = label.into();
        let mode = desktop
            .anchor_preference(&label)
            .unwrap_or(AnchorMode::Anchored(options.default_anchor));

        Self {
            drift: DriftController::new(mode, options.default_anchor, options.snap_settle, options.insets),
            collapse: CollapseController::new(options.layout, hidden_panels, options.snap_settle),
            cache: WorkspaceCache::new(options.save_delay),
            switcher: WorkspaceSwitcher::new(display_index),
            main_view_active: false,
            label,
            desktop,
            window,
        }
    }

    #[must_use]
    pub fn label(&self) -> &str { &self.label }

    #[must_use]
    pub const fn display_index(&self) -> usize { self.switcher.display_index() }

    #[must_use]
    pub const fn is_main_view_active(&self) -> bool { self.main_view_active }

    #[must_use]
    pub const fn desktop(&self) -> &D { &self.desktop }

    #[must_use]
    pub const fn window(&self) -> &W { &self.window }

    #[must_use]
    pub const fn active_workspace(&self) -> Option<WorkspaceId> { self.cache.active_id() }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Marks the main view visible. The next tick reloads the active
    /// desktop and re-places the window.
    pub const fn activate(&mut self) {
        self.main_view_active = true;
        self.switcher.reset();
        self.drift.reset_tracking();
    }

    /// Marks the main view hidden and writes everything pending.
    ///
    /// The poll loop may be stopped while hidden, so later edits are written
    /// through instead of debounced.
    pub fn deactivate(&mut self) {
        self.main_view_active = false;
        self.cache.flush_all(&self.desktop);
    }

    /// Runs one poll step.
    ///
    /// While the main view is hidden only due writes are performed.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        if !self.main_view_active {
            return TickReport {
                workspace: SwitchOutcome::Unchanged,
                drift: DriftAction::Idle,
                collapse_changed: false,
                flushed: self.flush_due(now),
            };
        }

        let workspace = self.switcher.poll(&self.desktop, &mut self.cache);
        let flushed = self.flush_due(now);

        let (drift, collapse_changed) = match self.sample() {
            Ok(sample) => {
                let collapse_changed =
                    self.collapse
                        .reclassify(sample.size.height, sample.monitor.scale_factor, now);
                let action = self.drift.observe(&sample, now);
                self.carry_out(action, now);
                (action, collapse_changed)
            }
            Err(e) => {
                tracing::debug!("session[{}]: geometry unavailable: {e}", self.label);
                (DriftAction::Idle, false)
            }
        };

        TickReport {
            workspace,
            drift,
            collapse_changed,
            flushed,
        }
    }

    /// Writes pending values whose delay has elapsed.
    pub fn flush_due(&mut self, now: Instant) -> usize { self.cache.flush_due(&self.desktop, now) }

    /// Writes every pending value now.
    pub fn flush_all(&mut self) { self.cache.flush_all(&self.desktop); }

    /// When the next pending write becomes due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> { self.cache.next_deadline() }

    /// Forgets the last placement after the display layout changed.
    ///
    /// The next tick re-snaps an anchored window onto its display's new
    /// bounds instead of reading the changed frame as a drag.
    pub const fn displays_changed(&mut self) {
        self.drift.reset_tracking();
    }

    /// Drops cached desktop data and re-reads the active desktop.
    ///
    /// Used after the store was changed behind the cache's back. Callers
    /// flush first and hold the session lock across the store change, since
    /// writes still pending here are discarded. The next tick also refreshes
    /// the desktop descriptor (name and color).
    pub fn reload(&mut self) {
        self.switcher.reset();
        self.cache.invalidate_all();
        if let Some(id) = self.cache.active_id() {
            self.cache.activate(&self.desktop, id);
        }
    }

    // ========================================================================
    // Geometry
    // ========================================================================

    fn sample(&self) -> BridgeResult<WindowSample> {
        let monitor = self
            .window
            .monitors()?
            .get(self.display_index())
            .copied()
            .ok_or_else(|| BridgeError::Unavailable(format!("display {}", self.display_index())))?;

        Ok(WindowSample {
            position: self.window.window_position()?,
            size: self.window.window_size()?,
            monitor,
        })
    }

    fn carry_out(&mut self, action: DriftAction, now: Instant) {
        match action {
            DriftAction::Idle => {}
            DriftAction::Resnap(target) => {
                if let Err(e) = self.move_to(target, now) {
                    tracing::debug!("session[{}]: re-snap failed: {e}", self.label);
                }
            }
            DriftAction::Detached => self.persist_anchor(AnchorMode::Free),
        }
    }

    fn move_to(&mut self, target: Position, now: Instant) -> BridgeResult<()> {
        self.drift.record_programmatic_move(target, now);
        self.window.move_window(target)
    }

    fn persist_anchor(&self, mode: AnchorMode) {
        if let Err(e) = self.desktop.save_anchor_preference(&self.label, mode) {
            tracing::warn!("session[{}]: failed to save anchor: {e}", self.label);
        }
    }

    /// Moves the window to its anchor (or last anchor while free).
    ///
    /// # Errors
    ///
    /// Returns an error if the window geometry cannot be read or the move fails.
    pub fn snap(&mut self, now: Instant) -> BridgeResult<Position> {
        let sample = self.sample()?;
        let target = self.drift.target(&sample.monitor, sample.size);
        self.move_to(target, now)?;
        Ok(target)
    }

    /// Anchors the window to `anchor`, persists the choice and snaps.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be moved. The anchor is still
    /// selected and persisted.
    pub fn select_anchor(&mut self, anchor: Anchor, now: Instant) -> BridgeResult<Position> {
        self.drift.select_anchor(anchor);
        self.persist_anchor(AnchorMode::Anchored(anchor));
        self.snap(now)
    }

    /// Re-anchors to the last anchor used and snaps.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be moved.
    pub fn snap_back(&mut self, now: Instant) -> BridgeResult<Position> {
        self.select_anchor(self.drift.last_anchor(), now)
    }

    /// Flips collapsed/expanded and resizes the window.
    ///
    /// Returns `true` if the widget is now collapsed.
    ///
    /// # Errors
    ///
    /// Returns an error if the window cannot be read or resized; the mode is
    /// left unchanged in that case.
    pub fn toggle_collapse(&mut self, now: Instant) -> BridgeResult<bool> {
        let sample = self.sample()?;
        let collapsed = self.collapse.toggle();
        if let Err(e) = self.fit_window(&sample, now) {
            self.collapse.toggle();
            return Err(e);
        }
        Ok(collapsed)
    }

    /// Shows or hides a panel, resizing when expanded on the main view.
    ///
    /// # Errors
    ///
    /// Returns an error if the resize fails. The visibility change is kept.
    pub fn set_panel_visible(&mut self, panel: PanelKind, visible: bool, now: Instant) -> BridgeResult<()> {
        if self.collapse.set_panel_visible(panel, visible) && self.main_view_active {
            let sample = self.sample()?;
            self.fit_window(&sample, now)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn hidden_panels(&self) -> Vec<PanelKind> { self.collapse.hidden_panels() }

    /// Resizes to the current mode, keeping the visual anchor.
    fn fit_window(&mut self, sample: &WindowSample, now: Instant) -> BridgeResult<()> {
        let size = self.collapse.target_size(sample.monitor.scale_factor);
        if size == sample.size {
            return Ok(());
        }

        self.collapse.record_resize(size, now);
        self.window.resize_window(size)?;

        if let Some(position) = compensated_position(sample.position, sample.size, size, &sample.monitor) {
            self.move_to(position, now)?;
        }
        Ok(())
    }

    // ========================================================================
    // Tasks
    // ========================================================================

    fn edit(&mut self, edit: TaskEdit, now: Instant) -> bool {
        let Some(id) = self.cache.active_id() else {
            tracing::debug!("session[{}]: edit before any workspace was loaded", self.label);
            return false;
        };
        let changed = self.cache.apply(&self.desktop, id, edit, now);
        self.write_through_if_hidden(id);
        changed
    }

    fn write_through_if_hidden(&mut self, id: WorkspaceId) {
        if !self.main_view_active {
            self.cache.flush(&self.desktop, id);
        }
    }

    pub fn add_task(&mut self, text: &str, now: Instant) -> bool {
        self.edit(TaskEdit::Add { text: text.to_string() }, now)
    }

    pub fn toggle_task(&mut self, id: &str, now: Instant) -> bool {
        self.edit(TaskEdit::Toggle { id: id.to_string() }, now)
    }

    pub fn update_task_text(&mut self, id: &str, text: &str, now: Instant) -> bool {
        self.edit(
            TaskEdit::EditText {
                id: id.to_string(),
                text: text.to_string(),
            },
            now,
        )
    }

    pub fn delete_task(&mut self, id: &str, now: Instant) -> bool {
        self.edit(TaskEdit::Delete { id: id.to_string() }, now)
    }

    pub fn reorder_tasks(&mut self, order: Vec<String>, now: Instant) -> bool {
        self.edit(TaskEdit::Reorder { order }, now)
    }

    /// Sets the active desktop's title. Returns `false` if none is loaded.
    pub fn update_title(&mut self, title: &str, now: Instant) -> bool {
        let Some(id) = self.cache.active_id() else {
            return false;
        };
        self.cache.set_title(&self.desktop, id, title, now);
        self.write_through_if_hidden(id);
        true
    }

    // ========================================================================
    // Desktops and history
    // ========================================================================

    /// Asks the OS to show `target` on this window's display.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::PermissionDenied` without the accessibility
    /// permission, or the bridge's error.
    pub fn switch_workspace(&self, target: WorkspaceId) -> BridgeResult<bool> {
        self.switcher.request_switch(&self.desktop, target)
    }

    /// Desktops of every display, with this session's cached edits applied.
    ///
    /// # Errors
    ///
    /// Returns the bridge's error if the desktops cannot be listed.
    pub fn overview(&self) -> BridgeResult<Vec<DisplayGroup>> {
        Ok(self.cache.overlay_summaries(self.desktop.workspaces_grouped()?))
    }

    /// # Errors
    ///
    /// Returns the bridge's error if the log cannot be read.
    pub fn completed_tasks(&self) -> BridgeResult<Vec<CompletedTask>> { self.desktop.completed_tasks() }

    /// # Errors
    ///
    /// Returns the bridge's error if the log cannot be cleared.
    pub fn clear_completed(&self) -> BridgeResult<()> { self.desktop.clear_completed() }

    // ========================================================================
    // Snapshot
    // ========================================================================

    #[must_use]
    pub fn snapshot(&self) -> WidgetSnapshot {
        let record = self.cache.active_record();
        WidgetSnapshot {
            window_label: self.label.clone(),
            display_index: self.display_index(),
            workspace: self.switcher.current().cloned(),
            title: record.map(|r| r.title.clone()).unwrap_or_default(),
            tasks: record.map(|r| r.tasks.clone()).unwrap_or_default(),
            anchor: self.drift.mode(),
            last_anchor: self.drift.last_anchor(),
            off_monitor: self.drift.off_monitor(),
            collapsed: self.collapse.is_collapsed(),
            hidden_panels: self.collapse.hidden_panels(),
            can_switch: self.desktop.switching_permitted(),
            main_view_active: self.main_view_active,
        }
    }
}
