//! Tauri commands invoked by the widget web view.
//!
//! Every command is `async` so it runs off the main thread: session methods
//! read and move the window, and Tauri serves those calls on the main thread.
//! Commands that act on one widget resolve it from the calling window.

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Utc;
use deskmate_core::collapse::PanelKind;
use deskmate_core::geometry::Anchor;
use deskmate_core::types::{CompletedTask, DisplayGroup, SavedContext};
use deskmate_core::{Position, WidgetSnapshot, WorkspaceId};
use serde::Serialize;
use tauri::{AppHandle, Emitter, State, WebviewWindow};

use super::registry::{NativeSession, WidgetRegistry};
use crate::error::DeskmateError;
use crate::events;
use crate::platform::accessibility;

type CommandResult<T> = Result<T, DeskmateError>;

/// Settings the web view needs at startup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSettings {
    pub hidden_panels: Vec<PanelKind>,
    pub setup_complete: bool,
    pub accessibility_granted: bool,
}

/// Applies a task edit on the calling widget and returns its new state.
fn edit(
    registry: &WidgetRegistry,
    window: &WebviewWindow,
    f: impl FnOnce(&mut NativeSession, Instant) -> bool,
) -> CommandResult<WidgetSnapshot> {
    registry.with_session(window.label(), |session| {
        if !f(session, Instant::now()) {
            tracing::debug!(label = session.label(), "edit had no effect");
        }
        session.snapshot()
    })
}

/// Runs a data file change with every widget flushed before and reloaded after.
fn rewrite_data<T>(
    registry: &WidgetRegistry,
    app: &AppHandle,
    f: impl FnOnce() -> CommandResult<T>,
) -> CommandResult<T> {
    let result = registry.rewrite(f)?;
    if let Err(err) = app.emit(events::workspace::DATA_CHANGED, ()) {
        tracing::warn!(error = %err, "failed to emit data change");
    }
    Ok(result)
}

// ============================================================================
// Widget state
// ============================================================================

#[tauri::command]
pub async fn widget_snapshot(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
) -> CommandResult<WidgetSnapshot> {
    registry.with_session(window.label(), |session| session.snapshot())
}

/// Called when the web view shows or hides its main view.
#[tauri::command]
pub async fn set_view_active(
    registry: State<'_, WidgetRegistry>,
    app: AppHandle,
    window: WebviewWindow,
    active: bool,
) -> CommandResult<()> {
    registry.set_view_active(&app, window.label(), active)
}

// ============================================================================
// Tasks and title
// ============================================================================

#[tauri::command]
pub async fn add_task(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
    text: String,
) -> CommandResult<WidgetSnapshot> {
    edit(&registry, &window, |session, now| session.add_task(&text, now))
}

#[tauri::command]
pub async fn toggle_task(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
    id: String,
) -> CommandResult<WidgetSnapshot> {
    edit(&registry, &window, |session, now| session.toggle_task(&id, now))
}

#[tauri::command]
pub async fn update_task_text(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
    id: String,
    text: String,
) -> CommandResult<WidgetSnapshot> {
    edit(&registry, &window, |session, now| session.update_task_text(&id, &text, now))
}

#[tauri::command]
pub async fn delete_task(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
    id: String,
) -> CommandResult<WidgetSnapshot> {
    edit(&registry, &window, |session, now| session.delete_task(&id, now))
}

#[tauri::command]
pub async fn reorder_tasks(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
    order: Vec<String>,
) -> CommandResult<WidgetSnapshot> {
    edit(&registry, &window, |session, now| session.reorder_tasks(order, now))
}

#[tauri::command]
pub async fn update_title(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
    title: String,
) -> CommandResult<WidgetSnapshot> {
    edit(&registry, &window, |session, now| session.update_title(&title, now))
}

// ============================================================================
// Placement
// ============================================================================

#[tauri::command]
pub async fn select_anchor(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
    anchor: Anchor,
) -> CommandResult<Position> {
    registry.with_session(window.label(), |session| session.select_anchor(anchor, Instant::now()))?.map_err(Into::into)
}

#[tauri::command]
pub async fn snap_back(registry: State<'_, WidgetRegistry>, window: WebviewWindow) -> CommandResult<Position> {
    registry.with_session(window.label(), |session| session.snap_back(Instant::now()))?.map_err(Into::into)
}

/// Returns `true` if the widget is now collapsed.
#[tauri::command]
pub async fn toggle_collapse(registry: State<'_, WidgetRegistry>, window: WebviewWindow) -> CommandResult<bool> {
    registry.with_session(window.label(), |session| session.toggle_collapse(Instant::now()))?.map_err(Into::into)
}

/// Shows or hides a panel on every widget. Returns the hidden panels.
#[tauri::command]
pub async fn set_panel_visible(
    registry: State<'_, WidgetRegistry>,
    panel: PanelKind,
    visible: bool,
) -> CommandResult<Vec<PanelKind>> {
    registry.set_panel_visible(panel, visible, Instant::now())
}

// ============================================================================
// Desktops
// ============================================================================

/// Returns `false` when the target desktop is already shown.
#[tauri::command]
pub async fn switch_workspace(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
    workspace_id: i64,
) -> CommandResult<bool> {
    registry
        .with_session(window.label(), |session| session.switch_workspace(WorkspaceId(workspace_id)))?
        .map_err(Into::into)
}

#[tauri::command]
pub async fn list_workspaces_grouped(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
) -> CommandResult<Vec<DisplayGroup>> {
    registry.with_session(window.label(), |session| session.overview())?.map_err(Into::into)
}

/// Sets or clears (`None`) a desktop's custom color.
#[tauri::command]
pub async fn save_color(
    registry: State<'_, WidgetRegistry>,
    app: AppHandle,
    workspace_id: i64,
    color: Option<String>,
) -> CommandResult<()> {
    let store = registry.store();
    rewrite_data(&registry, &app, || {
        Ok(store.set_custom_color(WorkspaceId(workspace_id), color.as_deref())?)
    })
}

// ============================================================================
// History
// ============================================================================

#[tauri::command]
pub async fn completed_tasks(
    registry: State<'_, WidgetRegistry>,
    window: WebviewWindow,
) -> CommandResult<Vec<CompletedTask>> {
    registry.with_session(window.label(), |session| session.completed_tasks())?.map_err(Into::into)
}

#[tauri::command]
pub async fn clear_completed(registry: State<'_, WidgetRegistry>, window: WebviewWindow) -> CommandResult<()> {
    registry.with_session(window.label(), |session| session.clear_completed())?.map_err(Into::into)
}

/// Archives every desktop's notes and starts from empty lists.
///
/// Returns the number of archived desktops.
#[tauri::command]
pub async fn start_new_session(registry: State<'_, WidgetRegistry>, app: AppHandle) -> CommandResult<usize> {
    let store = registry.store();
    rewrite_data(&registry, &app, || Ok(store.start_new_session(Utc::now())?))
}

/// Deletes every desktop's title, tasks and custom color.
///
/// Returns the number of desktops that had data.
#[tauri::command]
pub async fn clear_all_data(registry: State<'_, WidgetRegistry>, app: AppHandle) -> CommandResult<usize> {
    let store = registry.store();
    rewrite_data(&registry, &app, || Ok(store.clear_all()?))
}

#[tauri::command]
pub async fn context_history(
    registry: State<'_, WidgetRegistry>,
) -> CommandResult<BTreeMap<WorkspaceId, Vec<SavedContext>>> {
    Ok(registry.store().context_history())
}

#[tauri::command]
pub async fn restore_context(
    registry: State<'_, WidgetRegistry>,
    app: AppHandle,
    workspace_id: i64,
    index: usize,
) -> CommandResult<SavedContext> {
    let store = registry.store();
    rewrite_data(&registry, &app, || Ok(store.restore_context(WorkspaceId(workspace_id), index)?))
}

// ============================================================================
// Permissions and settings
// ============================================================================

#[tauri::command]
pub async fn check_accessibility() -> bool { accessibility::is_trusted() }

/// Shows the system accessibility prompt if access is missing.
#[tauri::command]
pub async fn request_accessibility() -> bool { accessibility::check_and_prompt() }

#[tauri::command]
pub async fn get_settings(registry: State<'_, WidgetRegistry>) -> CommandResult<WidgetSettings> {
    let store = registry.store();
    Ok(WidgetSettings {
        hidden_panels: store.hidden_panels(),
        setup_complete: store.setup_complete(),
        accessibility_granted: accessibility::is_trusted(),
    })
}

#[tauri::command]
pub async fn complete_setup(registry: State<'_, WidgetRegistry>) -> CommandResult<()> {
    Ok(registry.store().complete_setup()?)
}
