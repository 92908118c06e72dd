//! Widget sessions keyed by window label, with their poll loops.
//!
//! The registry lock is held only to look up or swap entries; session work
//! always happens under the session's own lock so one slow window never
//! blocks another.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use deskmate_core::collapse::PanelKind;
use deskmate_core::poller::shared;
use deskmate_core::store::DataStore;
use deskmate_core::{SessionOptions, SharedSession, WidgetSession, rewrite_sessions, run_poll_loop};
use parking_lot::Mutex;
use tauri::async_runtime::JoinHandle;
use tauri::{AppHandle, Emitter, EventTarget, WebviewWindow};
use tokio::sync::watch;

use super::bridge::{NativeDesktop, TauriWindow};
use crate::config::DeskmateConfig;
use crate::error::DeskmateError;
use crate::events;

pub type NativeSession = WidgetSession<NativeDesktop, TauriWindow>;

const RETIRE_LOCK_WAIT: Duration = Duration::from_millis(250);

struct PollerHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    /// Asks the loop to exit after its current step.
    fn stop(self) {
        if self.stop.send(true).is_err() {
            // Receiver gone: the loop already returned.
            self.task.abort();
        }
    }
}

struct WidgetEntry {
    session: SharedSession<NativeDesktop, TauriWindow>,
    poller: Option<PollerHandle>,
}

/// Every live widget window, shared as Tauri managed state.
pub struct WidgetRegistry {
    store: Arc<DataStore>,
    config: &'static DeskmateConfig,
    widgets: Mutex<HashMap<String, WidgetEntry>>,
}

impl WidgetRegistry {
    #[must_use]
    pub fn new(store: Arc<DataStore>, config: &'static DeskmateConfig) -> Self {
        Self {
            store,
            config,
            widgets: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<DataStore> { &self.store }

    /// Labels of the attached widgets, sorted.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.widgets.lock().keys().cloned().collect();
        labels.sort();
        labels
    }

    /// Creates an active session for `window`. Re-attaching replaces the old one.
    pub fn attach(&self, window: WebviewWindow, display_index: usize) {
        let label = window.label().to_string();
        let mut session = WidgetSession::new(
            label.clone(),
            display_index,
            NativeDesktop::new(Arc::clone(&self.store)),
            TauriWindow::new(window),
            SessionOptions::from(self.config),
            self.store.hidden_panels(),
        );
        session.activate();

        let previous = self.widgets.lock().insert(label.clone(), WidgetEntry {
            session: shared(session),
            poller: None,
        });
        if let Some(previous) = previous {
            Self::retire(previous);
        }
        tracing::info!(label, display_index, "widget attached");
    }

    /// Starts the poll loop of an attached widget. No-op if already running.
    pub fn start(&self, app: &AppHandle, label: &str) {
        let mut widgets = self.widgets.lock();
        let Some(entry) = widgets.get_mut(label) else {
            tracing::warn!(label, "cannot start poller for unknown widget");
            return;
        };
        if entry.poller.is_some() {
            return;
        }

        let (stop, stop_rx) = watch::channel(false);
        let session = Arc::clone(&entry.session);
        let interval = self.config.polling.interval();
        let app = app.clone();
        let target = label.to_string();

        let task = tauri::async_runtime::spawn(async move {
            run_poll_loop(session, interval, stop_rx, move |snapshot| {
                let event_target = EventTarget::WebviewWindow { label: target.clone() };
                if let Err(err) = app.emit_to(event_target, events::widget::STATE_CHANGED, snapshot) {
                    tracing::warn!(error = %err, label = %target, "failed to emit widget state");
                }
            })
            .await;
        });
        entry.poller = Some(PollerHandle { stop, task });
    }

    /// Runs `f` on the session of `label` under its lock.
    ///
    /// # Errors
    ///
    /// Returns `DeskmateError::WidgetNotFound` if no widget has that label.
    pub fn with_session<R>(
        &self,
        label: &str,
        f: impl FnOnce(&mut NativeSession) -> R,
    ) -> Result<R, DeskmateError> {
        let session = self
            .widgets
            .lock()
            .get(label)
            .map(|entry| Arc::clone(&entry.session))
            .ok_or_else(|| DeskmateError::WidgetNotFound(label.to_string()))?;
        let mut session = session.lock();
        Ok(f(&mut session))
    }

    /// Sessions sorted by label, so multi-session locking has one order.
    fn sessions(&self) -> Vec<SharedSession<NativeDesktop, TauriWindow>> {
        let widgets = self.widgets.lock();
        let mut entries: Vec<(&String, &WidgetEntry)> = widgets.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, entry)| Arc::clone(&entry.session)).collect()
    }

    /// Shows or hides the main view of one widget.
    ///
    /// Hiding flushes pending edits and stops the poll loop; showing starts
    /// it again.
    ///
    /// # Errors
    ///
    /// Returns `DeskmateError::WidgetNotFound` if no widget has that label.
    pub fn set_view_active(&self, app: &AppHandle, label: &str, active: bool) -> Result<(), DeskmateError> {
        self.with_session(label, |session| {
            if active {
                session.activate();
            } else {
                session.deactivate();
            }
        })?;

        if active {
            self.start(app, label);
        } else {
            let poller = self.widgets.lock().get_mut(label).and_then(|entry| entry.poller.take());
            if let Some(poller) = poller {
                poller.stop();
                tracing::debug!(label, "widget hidden, poller stopped");
            }
        }
        Ok(())
    }

    /// Changes the data file underneath every widget.
    ///
    /// All sessions stay locked from their flush until their reload, so no
    /// edit made in between is lost.
    pub fn rewrite<T>(&self, rewrite: impl FnOnce() -> T) -> T {
        rewrite_sessions(&self.sessions(), rewrite)
    }

    /// Re-places every widget on its display after the display layout changed.
    pub fn displays_changed(&self) {
        for session in self.sessions() {
            session.lock().displays_changed();
        }
    }

    /// Applies a panel visibility change to every widget and persists it.
    ///
    /// # Errors
    ///
    /// Returns an error if the setting cannot be written.
    pub fn set_panel_visible(
        &self,
        panel: PanelKind,
        visible: bool,
        now: Instant,
    ) -> Result<Vec<PanelKind>, DeskmateError> {
        let mut hidden: Vec<PanelKind> = self.store.hidden_panels();
        hidden.retain(|p| *p != panel);
        if !visible {
            hidden.push(panel);
        }
        hidden.sort();

        for session in self.sessions() {
            let mut session = session.lock();
            if let Err(err) = session.set_panel_visible(panel, visible, now) {
                tracing::warn!(error = %err, label = session.label(), "failed to resize for panel change");
            }
        }
        self.store.set_hidden_panels(&hidden)?;
        Ok(hidden)
    }

    /// Stops the widget's poller and flushes its pending edits.
    pub fn detach(&self, label: &str) {
        let entry = self.widgets.lock().remove(label);
        if let Some(entry) = entry {
            Self::retire(entry);
            tracing::info!(label, "widget detached");
        }
    }

    /// Detaches every widget. Called on app exit.
    pub fn shutdown(&self) {
        let entries: Vec<WidgetEntry> = self.widgets.lock().drain().map(|(_, entry)| entry).collect();
        for entry in entries {
            Self::retire(entry);
        }
    }

    fn retire(entry: WidgetEntry) {
        if let Some(poller) = entry.poller {
            poller.stop();
        }
        // Window events arrive on the main thread, which a running tick may
        // be waiting on to read the window frame.
        if let Some(mut session) = entry.session.try_lock_for(RETIRE_LOCK_WAIT) {
            session.deactivate();
            return;
        }
        let session = entry.session;
        thread::spawn(move || session.lock().deactivate());
    }
}
