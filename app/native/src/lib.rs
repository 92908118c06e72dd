//! Deskmate - a floating notes and tasks widget that follows macOS desktops.
//!
//! This library provides both the desktop application and CLI functionality.
//! The desktop app shows one widget window per display; each window keeps
//! a title and task list per virtual desktop, driven by the sync engine in
//! `deskmate_core`.

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod platform;

mod widget;

use std::sync::Arc;

use deskmate_core::store::DataStore;
use tauri::{Manager, RunEvent, WindowEvent};

use crate::widget::WidgetRegistry;
use crate::widget::commands;

/// Runs the Tauri desktop application.
///
/// This initializes all components and starts the GUI event loop.
///
/// # Panics
///
/// Panics if Tauri fails to initialize or the event loop encounters an error.
pub fn run() {
    logging::init();
    let config = config::init();

    let store = match DataStore::open_default() {
        Ok(store) => Arc::new(store),
        Err(err) => {
            tracing::error!(error = %err, "cannot open the data file");
            return;
        }
    };
    tracing::info!(path = %store.path().display(), "data file ready");

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _args, _cwd| {
            if let Some(main) = app.get_webview_window(widget::MAIN_LABEL) {
                let _ = main.show();
            }
        }))
        .plugin(tauri_plugin_process::init())
        .manage(WidgetRegistry::new(store, config))
        .invoke_handler(tauri::generate_handler![
            commands::widget_snapshot,
            commands::set_view_active,
            commands::add_task,
            commands::toggle_task,
            commands::update_task_text,
            commands::delete_task,
            commands::reorder_tasks,
            commands::update_title,
            commands::select_anchor,
            commands::snap_back,
            commands::toggle_collapse,
            commands::set_panel_visible,
            commands::switch_workspace,
            commands::list_workspaces_grouped,
            commands::save_color,
            commands::completed_tasks,
            commands::clear_completed,
            commands::start_new_session,
            commands::context_history,
            commands::restore_context,
            commands::clear_all_data,
            commands::check_accessibility,
            commands::request_accessibility,
            commands::get_settings,
            commands::complete_setup,
        ])
        .setup(|app| {
            // Keep the widget out of the Dock and the app switcher
            if let Err(err) = app.handle().set_activation_policy(tauri::ActivationPolicy::Accessory) {
                tracing::warn!(error = %err, "failed to set activation policy");
            }

            widget::init(app);

            let handle = app.handle().clone();
            if !platform::displays::observe(move || widget::sync_to_monitors(&handle)) {
                tracing::warn!("display changes will not re-place widgets");
            }
            Ok(())
        })
        .on_window_event(|window, event| {
            if matches!(event, WindowEvent::Destroyed) {
                window.state::<WidgetRegistry>().detach(window.label());
            }
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app, event| {
        if matches!(event, RunEvent::ExitRequested { .. }) {
            tracing::info!("exit requested, flushing pending edits");
            app.state::<WidgetRegistry>().shutdown();
        }
    });
}
