//! The floating widget windows, one per display.
//!
//! The `main` window (declared in `tauri.conf.json`) serves the first
//! display; `monitor-N` windows are created for every additional display.
//! When displays come and go, windows are opened or closed to match and
//! every widget is re-placed on its display.

pub mod bridge;
pub mod commands;
pub mod registry;

use tauri::{App, AppHandle, Emitter, Manager, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

pub use registry::WidgetRegistry;

use crate::events;
use crate::platform::{active_display_count, make_floating_widget};

/// Label of the widget window on the first display.
pub const MAIN_LABEL: &str = "main";

const MONITOR_LABEL_PREFIX: &str = "monitor-";

/// Window label for the widget on `display_index`.
#[must_use]
pub fn label_for_display(display_index: usize) -> String {
    if display_index == 0 {
        MAIN_LABEL.to_string()
    } else {
        format!("{MONITOR_LABEL_PREFIX}{display_index}")
    }
}

/// Display index encoded in a window label. Unknown labels map to 0.
#[must_use]
pub fn display_for_label(label: &str) -> usize {
    label
        .strip_prefix(MONITOR_LABEL_PREFIX)
        .and_then(|index| index.parse().ok())
        .unwrap_or(0)
}

fn build_monitor_window(app: &AppHandle, display_index: usize) -> tauri::Result<WebviewWindow> {
    let config = crate::config::get_config();
    let layout = config.widget.layout();
    WebviewWindowBuilder::new(app, label_for_display(display_index), WebviewUrl::default())
        .title("Deskmate")
        .inner_size(f64::from(layout.width), f64::from(layout.full_height()))
        .decorations(false)
        .transparent(true)
        .resizable(false)
        .shadow(false)
        .always_on_top(true)
        .visible_on_all_workspaces(true)
        .skip_taskbar(true)
        .build()
}

fn attach(app: &AppHandle, window: WebviewWindow) {
    let label = window.label().to_string();
    let display_index = display_for_label(&label);
    make_floating_widget(&window);

    let registry = app.state::<WidgetRegistry>();
    registry.attach(window, display_index);
    registry.start(app, &label);
}

/// Configures the main widget and opens one per additional display.
pub fn init(app: &App) {
    let handle = app.handle();
    let Some(main) = handle.get_webview_window(MAIN_LABEL) else {
        tracing::error!("'{MAIN_LABEL}' window not found in tauri.conf.json");
        return;
    };

    let monitor_count = main
        .available_monitors()
        .map(|monitors| monitors.len())
        .ok()
        .filter(|count| *count > 0)
        .unwrap_or_else(active_display_count);
    attach(handle, main);

    for display_index in 1..monitor_count {
        match build_monitor_window(handle, display_index) {
            Ok(window) => attach(handle, window),
            Err(err) => {
                tracing::warn!(error = %err, display_index, "failed to create widget window");
            }
        }
    }
    tracing::info!(widgets = monitor_count, "widgets initialized");
}

/// Widget windows to open and close for a new display count.
#[derive(Debug, Default, PartialEq, Eq)]
struct MonitorSync {
    open: Vec<usize>,
    close: Vec<String>,
}

/// Plans windows for `monitor_count` displays given the attached `labels`.
///
/// The main window is never opened or closed here; it moves with display 0.
fn plan_monitor_sync(labels: &[String], monitor_count: usize) -> MonitorSync {
    let open = (1..monitor_count)
        .filter(|display_index| !labels.contains(&label_for_display(*display_index)))
        .collect();
    let close = labels
        .iter()
        .filter(|label| label.as_str() != MAIN_LABEL && display_for_label(label) >= monitor_count.max(1))
        .cloned()
        .collect();
    MonitorSync { open, close }
}

/// Matches widget windows to the current displays and re-places them.
pub fn sync_to_monitors(app: &AppHandle) {
    let monitor_count = match app.available_monitors() {
        Ok(monitors) => monitors.len(),
        Err(err) => {
            tracing::warn!(error = %err, "failed to list monitors after display change");
            return;
        }
    };

    let registry = app.state::<WidgetRegistry>();
    let plan = plan_monitor_sync(&registry.labels(), monitor_count);

    for display_index in plan.open {
        match build_monitor_window(app, display_index) {
            Ok(window) => attach(app, window),
            Err(err) => tracing::warn!(error = %err, display_index, "failed to create widget window"),
        }
    }
    for label in plan.close {
        if let Some(window) = app.get_webview_window(&label)
            && let Err(err) = window.close()
        {
            tracing::warn!(error = %err, label = %label, "failed to close widget window");
        }
    }

    registry.displays_changed();
    if let Err(err) = app.emit(events::widget::MONITORS_CHANGED, monitor_count) {
        tracing::warn!(error = %err, "failed to emit monitor change");
    }
    tracing::info!(monitors = monitor_count, "widgets synced to displays");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_for_display() {
        assert_eq!(label_for_display(0), "main");
        assert_eq!(label_for_display(2), "monitor-2");
    }

    #[test]
    fn test_display_for_label() {
        assert_eq!(display_for_label("main"), 0);
        assert_eq!(display_for_label("monitor-3"), 3);
        assert_eq!(display_for_label("monitor-x"), 0);
        assert_eq!(display_for_label("settings"), 0);
    }

    fn labels(labels: &[&str]) -> Vec<String> { labels.iter().map(ToString::to_string).collect() }

    #[test]
    fn test_monitor_sync_opens_windows_for_new_displays() {
        let plan = plan_monitor_sync(&labels(&["main"]), 3);
        assert_eq!(plan.open, vec![1, 2]);
        assert!(plan.close.is_empty());
    }

    #[test]
    fn test_monitor_sync_closes_windows_of_removed_displays() {
        let plan = plan_monitor_sync(&labels(&["main", "monitor-1", "monitor-2"]), 2);
        assert!(plan.open.is_empty());
        assert_eq!(plan.close, vec!["monitor-2".to_string()]);
    }

    #[test]
    fn test_monitor_sync_keeps_main_window() {
        let plan = plan_monitor_sync(&labels(&["main", "monitor-1"]), 0);
        assert_eq!(plan, MonitorSync {
            open: Vec::new(),
            close: vec!["monitor-1".to_string()],
        });
        assert_eq!(plan_monitor_sync(&labels(&["main", "monitor-1"]), 2), MonitorSync::default());
    }

    #[test]
    fn test_labels_round_trip_per_display() {
        for display_index in 0..4 {
            assert_eq!(display_for_label(&label_for_display(display_index)), display_index);
        }
    }
}
