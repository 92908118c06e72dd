//! The JSON data file shared by every widget window.
//!
//! One document holds titles, task lists, settings, archived sessions and
//! the completed-task log. The whole document lives in memory behind a
//! mutex; every mutation rewrites the file through a temporary file and a
//! rename, so a crash never leaves a half-written file behind.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::collapse::PanelKind;
use crate::error::StoreError;
use crate::geometry::AnchorMode;
use crate::types::{CompletedTask, SavedContext, TaskItem, WorkspaceId};

/// Identifier used for the application data directory.
pub const APP_IDENTIFIER: &str = "com.deskmate.app";

/// Current document version.
pub const DATA_VERSION: u32 = 1;

/// Archived sessions kept per workspace; older ones are dropped.
pub const MAX_CONTEXT_HISTORY: usize = 20;

/// Settings persisted alongside the data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredSettings {
    pub custom_colors: BTreeMap<WorkspaceId, String>,
    pub setup_complete: bool,
    pub hidden_panels: BTreeSet<PanelKind>,
    /// Anchor preference per window label.
    pub anchors: BTreeMap<String, AnchorMode>,
}

/// The on-disk document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistData {
    pub notes: BTreeMap<WorkspaceId, Vec<TaskItem>>,
    pub titles: BTreeMap<WorkspaceId, String>,
    pub settings: StoredSettings,
    pub version: u32,
    pub context_history: BTreeMap<WorkspaceId, Vec<SavedContext>>,
    pub completed: Vec<CompletedTask>,
}

impl Default for PersistData {
    fn default() -> Self {
        Self {
            notes: BTreeMap::new(),
            titles: BTreeMap::new(),
            settings: StoredSettings::default(),
            version: DATA_VERSION,
            context_history: BTreeMap::new(),
            completed: Vec::new(),
        }
    }
}

/// File-backed store for `PersistData`.
#[derive(Debug)]
pub struct DataStore {
    path: PathBuf,
    data: Mutex<PersistData>,
}

impl DataStore {
    /// Default data file location inside the platform data directory.
    ///
    /// Debug builds use a separate file so development never touches real data.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if the platform has no data directory.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let file_name = if cfg!(debug_assertions) { "notes-dev.json" } else { "notes.json" };
        dirs::data_dir()
            .map(|dir| dir.join(APP_IDENTIFIER).join(file_name))
            .ok_or(StoreError::NoDataDir)
    }

    /// Opens the store at the default location.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoDataDir` if the platform has no data directory.
    pub fn open_default() -> Result<Self, StoreError> { Ok(Self::open(Self::default_path()?)) }

    /// Opens the store at `path`.
    ///
    /// A missing file starts empty. An unreadable file is moved aside to
    /// `<name>.corrupt` and the store starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = load(&path);
        Self {
            path,
            data: Mutex::new(data),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path { &self.path }

    /// A copy of the whole document.
    #[must_use]
    pub fn snapshot(&self) -> PersistData { self.data.lock().clone() }

    fn read<T>(&self, f: impl FnOnce(&PersistData) -> T) -> T { f(&self.data.lock()) }

    /// Applies `f` and writes the document.
    ///
    /// The in-memory change stays even if the write fails.
    fn update<T>(&self, f: impl FnOnce(&mut PersistData) -> T) -> Result<T, StoreError> {
        let mut data = self.data.lock();
        let out = f(&mut data);
        write_atomic(&self.path, &data)?;
        Ok(out)
    }

    // ========================================================================
    // Tasks and titles
    // ========================================================================

    #[must_use]
    pub fn tasks(&self, id: WorkspaceId) -> Vec<TaskItem> {
        self.read(|d| d.notes.get(&id).cloned().unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn save_tasks(&self, id: WorkspaceId, tasks: &[TaskItem]) -> Result<(), StoreError> {
        self.update(|d| {
            if tasks.is_empty() {
                d.notes.remove(&id);
            } else {
                d.notes.insert(id, tasks.to_vec());
            }
        })
    }

    #[must_use]
    pub fn title(&self, id: WorkspaceId) -> String {
        self.read(|d| d.titles.get(&id).cloned().unwrap_or_default())
    }

    /// Stores a title; an empty title removes the entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn save_title(&self, id: WorkspaceId, title: &str) -> Result<(), StoreError> {
        self.update(|d| {
            if title.is_empty() {
                d.titles.remove(&id);
            } else {
                d.titles.insert(id, title.to_string());
            }
        })
    }

    /// Number of open tasks stored for a workspace.
    #[must_use]
    pub fn open_task_count(&self, id: WorkspaceId) -> usize {
        self.read(|d| d.notes.get(&id).map_or(0, |tasks| tasks.iter().filter(|t| !t.done).count()))
    }

    /// Every workspace with a stored title or task list.
    #[must_use]
    pub fn known_workspaces(&self) -> Vec<WorkspaceId> {
        self.read(|d| {
            d.notes
                .keys()
                .chain(d.titles.keys())
                .copied()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect()
        })
    }

    // ========================================================================
    // Completed log
    // ========================================================================

    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn append_completed(
        &self,
        text: &str,
        workspace: WorkspaceId,
        at: DateTime<Utc>,
    ) -> Result<CompletedTask, StoreError> {
        let entry = CompletedTask {
            id: Uuid::now_v7().to_string(),
            text: text.to_string(),
            workspace_id: workspace,
            completed_at: at.to_rfc3339(),
        };
        self.update(|d| d.completed.push(entry.clone()))?;
        Ok(entry)
    }

    #[must_use]
    pub fn completed(&self) -> Vec<CompletedTask> { self.read(|d| d.completed.clone()) }

    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn clear_completed(&self) -> Result<usize, StoreError> {
        self.update(|d| std::mem::take(&mut d.completed).len())
    }

    // ========================================================================
    // Settings
    // ========================================================================

    #[must_use]
    pub fn custom_color(&self, id: WorkspaceId) -> Option<String> {
        self.read(|d| d.settings.custom_colors.get(&id).cloned())
    }

    /// Sets or clears a workspace's custom color.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn set_custom_color(&self, id: WorkspaceId, color: Option<&str>) -> Result<(), StoreError> {
        self.update(|d| match color {
            Some(color) => {
                d.settings.custom_colors.insert(id, color.to_string());
            }
            None => {
                d.settings.custom_colors.remove(&id);
            }
        })
    }

    #[must_use]
    pub fn hidden_panels(&self) -> Vec<PanelKind> {
        self.read(|d| d.settings.hidden_panels.iter().copied().collect())
    }

    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn set_hidden_panels(&self, panels: &[PanelKind]) -> Result<(), StoreError> {
        self.update(|d| d.settings.hidden_panels = panels.iter().copied().collect())
    }

    #[must_use]
    pub fn anchor(&self, window_label: &str) -> Option<AnchorMode> {
        self.read(|d| d.settings.anchors.get(window_label).copied())
    }

    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn save_anchor(&self, window_label: &str, mode: AnchorMode) -> Result<(), StoreError> {
        self.update(|d| {
            d.settings.anchors.insert(window_label.to_string(), mode);
        })
    }

    #[must_use]
    pub fn setup_complete(&self) -> bool { self.read(|d| d.settings.setup_complete) }

    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn complete_setup(&self) -> Result<(), StoreError> {
        self.update(|d| d.settings.setup_complete = true)
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Archives every non-empty workspace and clears all titles and tasks.
    ///
    /// Returns the number of workspaces archived.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn start_new_session(&self, at: DateTime<Utc>) -> Result<usize, StoreError> {
        let saved_at = at.to_rfc3339();
        self.update(|d| {
            let ids: BTreeSet<WorkspaceId> =
                d.notes.keys().chain(d.titles.keys()).copied().collect();

            let mut archived = 0;
            for id in ids {
                let title = d.titles.get(&id).cloned().unwrap_or_default();
                let tasks = d.notes.get(&id).cloned().unwrap_or_default();
                if title.is_empty() && tasks.is_empty() {
                    continue;
                }

                let history = d.context_history.entry(id).or_default();
                history.push(SavedContext {
                    title,
                    tasks,
                    saved_at: saved_at.clone(),
                });
                if history.len() > MAX_CONTEXT_HISTORY {
                    let excess = history.len() - MAX_CONTEXT_HISTORY;
                    history.drain(..excess);
                }
                archived += 1;
            }

            d.notes.clear();
            d.titles.clear();
            archived
        })
    }

    /// Deletes every title, task list and custom color.
    ///
    /// Archived sessions, the completed log and other settings are kept.
    /// Returns the number of workspaces that had data.
    ///
    /// # Errors
    ///
    /// Returns an error if the data file cannot be written.
    pub fn clear_all(&self) -> Result<usize, StoreError> {
        self.update(|d| {
            let ids: BTreeSet<WorkspaceId> = d
                .notes
                .keys()
                .chain(d.titles.keys())
                .chain(d.settings.custom_colors.keys())
                .copied()
                .collect();
            d.notes.clear();
            d.titles.clear();
            d.settings.custom_colors.clear();
            ids.len()
        })
    }

    #[must_use]
    pub fn context_history(&self) -> BTreeMap<WorkspaceId, Vec<SavedContext>> {
        self.read(|d| d.context_history.clone())
    }

    /// Replaces a workspace's current title and tasks with an archived context.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ContextNotFound` for an unknown index, or an
    /// error if the data file cannot be written.
    pub fn restore_context(&self, id: WorkspaceId, index: usize) -> Result<SavedContext, StoreError> {
        let saved = self
            .read(|d| d.context_history.get(&id).and_then(|h| h.get(index)).cloned())
            .ok_or(StoreError::ContextNotFound { workspace: id.0, index })?;

        self.update(|d| {
            d.notes.insert(id, saved.tasks.clone());
            if saved.title.is_empty() {
                d.titles.remove(&id);
            } else {
                d.titles.insert(id, saved.title.clone());
            }
        })?;
        Ok(saved)
    }
}

fn load(path: &Path) -> PersistData {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return PersistData::default(),
        Err(e) => {
            tracing::warn!("store: failed to read {}: {e}", path.display());
            return PersistData::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(data) => data,
        Err(e) => {
            let backup = path.with_extension("json.corrupt");
            tracing::warn!(
                "store: {} is not valid ({e}), moving it to {}",
                path.display(),
                backup.display()
            );
            if let Err(e) = fs::rename(path, &backup) {
                tracing::warn!("store: failed to move corrupt data file: {e}");
            }
            PersistData::default()
        }
    }
}

fn write_atomic(path: &Path, data: &PersistData) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    serde_json::to_writer_pretty(&mut file, data)?;
    file.flush()?;
    file.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}
