//! In-memory cache of per-desktop titles and task lists.
//!
//! The cache is the only copy the UI reads. Every edit is applied here first
//! and then scheduled for a debounced write, so the widget never waits on
//! storage and a burst of keystrokes costs one write. Tasks and titles have
//! separate debouncers: finishing a title edit never delays a task write and
//! vice versa.
//!
//! Records are created lazily on first load and live for the whole session.
//! Before a desktop's data is read or the active desktop changes, its pending
//! writes are flushed, so the store never lags behind an abandoned desktop.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::bridge::DesktopBridge;
use crate::debounce::Debouncer;
use crate::types::{DisplayGroup, TaskItem, WorkspaceId, WorkspaceRecord};

/// A single edit to a task list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEdit {
    /// Appends an open task. Blank text is ignored.
    Add { text: String },
    /// Flips a task's done flag.
    Toggle { id: String },
    /// Replaces a task's text.
    EditText { id: String, text: String },
    Delete { id: String },
    /// New order of the open tasks, by id. Done tasks follow in their
    /// existing relative order.
    Reorder { order: Vec<String> },
}

/// Titles and task lists for every desktop seen this session.
#[derive(Debug)]
pub struct WorkspaceCache {
    records: HashMap<WorkspaceId, WorkspaceRecord>,
    active: Option<WorkspaceId>,
    task_writes: Debouncer<WorkspaceId, Vec<TaskItem>>,
    title_writes: Debouncer<WorkspaceId, String>,
}

impl WorkspaceCache {
    #[must_use]
    pub fn new(save_delay: Duration) -> Self {
        Self {
            records: HashMap::new(),
            active: None,
            task_writes: Debouncer::new(save_delay),
            title_writes: Debouncer::new(save_delay),
        }
    }

    #[must_use]
    pub const fn active_id(&self) -> Option<WorkspaceId> { self.active }

    #[must_use]
    pub fn active_record(&self) -> Option<&WorkspaceRecord> {
        self.active.and_then(|id| self.records.get(&id))
    }

    #[must_use]
    pub fn record(&self, id: WorkspaceId) -> Option<&WorkspaceRecord> { self.records.get(&id) }

    #[must_use]
    pub fn is_cached(&self, id: WorkspaceId) -> bool { self.records.contains_key(&id) }

    #[must_use]
    pub fn has_pending_writes(&self) -> bool {
        !self.task_writes.is_empty() || !self.title_writes.is_empty()
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Reads a desktop's title and tasks from storage into the cache.
    ///
    /// Pending writes for that desktop are flushed first. A failed read keeps
    /// the cached value for that half of the record, or yields an empty one
    /// if the desktop was never cached.
    pub fn load<D: DesktopBridge + ?Sized>(&mut self, bridge: &D, id: WorkspaceId) -> &WorkspaceRecord {
        self.flush(bridge, id);
        let cached = self.records.get(&id);

        let tasks = bridge.tasks(id).unwrap_or_else(|e| {
            tracing::debug!("workspace: failed to load tasks for {id}: {e}");
            cached.map(|r| r.tasks.clone()).unwrap_or_default()
        });
        let title = bridge.title(id).unwrap_or_else(|e| {
            tracing::debug!("workspace: failed to load title for {id}: {e}");
            cached.map(|r| r.title.clone()).unwrap_or_default()
        });

        self.records.insert(id, WorkspaceRecord { title, tasks });
        self.records.entry(id).or_default()
    }

    /// Makes `id` the active desktop, reading it from storage.
    pub fn activate<D: DesktopBridge + ?Sized>(&mut self, bridge: &D, id: WorkspaceId) {
        self.load(bridge, id);
        self.active = Some(id);
    }

    /// Flushes the old desktop's pending writes, then activates `new`,
    /// loading it only if it is not cached yet.
    ///
    /// The flush completes before the load begins.
    pub fn flush_and_switch<D: DesktopBridge + ?Sized>(
        &mut self,
        bridge: &D,
        old: Option<WorkspaceId>,
        new: WorkspaceId,
    ) {
        if let Some(old) = old {
            self.flush(bridge, old);
        }
        self.ensure_loaded(bridge, new);
        self.active = Some(new);
    }

    /// Drops a cached record so the next access re-reads storage.
    ///
    /// Pending writes for the record are discarded.
    pub fn invalidate(&mut self, id: WorkspaceId) {
        self.task_writes.cancel(&id);
        self.title_writes.cancel(&id);
        self.records.remove(&id);
    }

    /// Drops every cached record and pending write.
    pub fn invalidate_all(&mut self) {
        self.task_writes.drain_all();
        self.title_writes.drain_all();
        self.records.clear();
    }

    fn ensure_loaded<D: DesktopBridge + ?Sized>(&mut self, bridge: &D, id: WorkspaceId) {
        if !self.records.contains_key(&id) {
            self.load(bridge, id);
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Applies a pure transformation to a desktop's tasks and schedules a write.
    pub fn mutate_tasks<D, F>(&mut self, bridge: &D, id: WorkspaceId, now: Instant, f: F)
    where
        D: DesktopBridge + ?Sized,
        F: FnOnce(&mut Vec<TaskItem>),
    {
        self.ensure_loaded(bridge, id);
        let record = self.records.entry(id).or_default();
        f(&mut record.tasks);
        self.task_writes.schedule(id, record.tasks.clone(), now);
    }

    /// Applies one edit. Returns `false` if the edit changed nothing.
    ///
    /// Marking a task done also appends it to the completed log.
    pub fn apply<D: DesktopBridge + ?Sized>(
        &mut self,
        bridge: &D,
        id: WorkspaceId,
        edit: TaskEdit,
        now: Instant,
    ) -> bool {
        self.ensure_loaded(bridge, id);
        let Some(record) = self.records.get(&id) else {
            return false;
        };

        let mut tasks = record.tasks.clone();
        let completed = match apply_edit(&mut tasks, edit) {
            EditOutcome::Unchanged => return false,
            EditOutcome::Changed => None,
            EditOutcome::Completed(text) => Some(text),
        };

        self.mutate_tasks(bridge, id, now, |current| *current = tasks);

        if let Some(text) = completed
            && let Err(e) = bridge.append_completed(&text, id)
        {
            tracing::debug!("workspace: failed to record completed task: {e}");
        }
        true
    }

    /// Replaces a desktop's title and schedules a write.
    pub fn set_title<D: DesktopBridge + ?Sized>(
        &mut self,
        bridge: &D,
        id: WorkspaceId,
        title: &str,
        now: Instant,
    ) {
        self.ensure_loaded(bridge, id);
        let record = self.records.entry(id).or_default();
        record.title = title.to_string();
        self.title_writes.schedule(id, record.title.clone(), now);
    }

    // ========================================================================
    // Flushing
    // ========================================================================

    /// Writes any pending tasks and title for `id` immediately.
    pub fn flush<D: DesktopBridge + ?Sized>(&mut self, bridge: &D, id: WorkspaceId) {
        if let Some(tasks) = self.task_writes.flush(&id) {
            write_tasks(bridge, id, &tasks);
        }
        if let Some(title) = self.title_writes.flush(&id) {
            write_title(bridge, id, &title);
        }
    }

    /// Writes every pending value immediately.
    pub fn flush_all<D: DesktopBridge + ?Sized>(&mut self, bridge: &D) {
        for (id, tasks) in self.task_writes.drain_all() {
            write_tasks(bridge, id, &tasks);
        }
        for (id, title) in self.title_writes.drain_all() {
            write_title(bridge, id, &title);
        }
    }

    /// Writes every pending value whose delay has elapsed.
    ///
    /// Returns the number of writes attempted.
    pub fn flush_due<D: DesktopBridge + ?Sized>(&mut self, bridge: &D, now: Instant) -> usize {
        let tasks = self.task_writes.take_due(now);
        let titles = self.title_writes.take_due(now);
        let count = tasks.len() + titles.len();

        for (id, tasks) in tasks {
            write_tasks(bridge, id, &tasks);
        }
        for (id, title) in titles {
            write_title(bridge, id, &title);
        }
        count
    }

    /// When the next pending write becomes due.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.task_writes.next_deadline(), self.title_writes.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ========================================================================
    // Overview
    // ========================================================================

    /// Overlays cached titles and open-task counts on stored summaries.
    ///
    /// Cached records may be ahead of storage while writes are pending, and
    /// the overview must agree with what the widget shows.
    #[must_use]
    pub fn overlay_summaries(&self, mut groups: Vec<DisplayGroup>) -> Vec<DisplayGroup> {
        for summary in groups.iter_mut().flat_map(|g| g.workspaces.iter_mut()) {
            if let Some(record) = self.records.get(&summary.workspace_id) {
                summary.title.clone_from(&record.title);
                summary.task_count = record.active_count();
            }
        }
        groups
    }
}

fn write_tasks<D: DesktopBridge + ?Sized>(bridge: &D, id: WorkspaceId, tasks: &[TaskItem]) {
    if let Err(e) = bridge.save_tasks(id, tasks) {
        tracing::warn!("workspace: failed to save tasks for {id}: {e}");
    }
}

fn write_title<D: DesktopBridge + ?Sized>(bridge: &D, id: WorkspaceId, title: &str) {
    if let Err(e) = bridge.save_title(id, title) {
        tracing::warn!("workspace: failed to save title for {id}: {e}");
    }
}

// ============================================================================
// Task list edits
// ============================================================================

enum EditOutcome {
    Unchanged,
    Changed,
    /// A task was marked done; carries its text.
    Completed(String),
}

fn apply_edit(tasks: &mut Vec<TaskItem>, edit: TaskEdit) -> EditOutcome {
    match edit {
        TaskEdit::Add { text } => {
            let text = text.trim();
            if text.is_empty() {
                return EditOutcome::Unchanged;
            }
            tasks.push(TaskItem::new(text));
            EditOutcome::Changed
        }
        TaskEdit::Toggle { id } => {
            let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
                return EditOutcome::Unchanged;
            };
            task.done = !task.done;
            if task.done { EditOutcome::Completed(task.text.clone()) } else { EditOutcome::Changed }
        }
        TaskEdit::EditText { id, text } => match tasks.iter_mut().find(|t| t.id == id) {
            Some(task) if task.text != text => {
                task.text = text;
                EditOutcome::Changed
            }
            _ => EditOutcome::Unchanged,
        },
        TaskEdit::Delete { id } => {
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            if tasks.len() == before { EditOutcome::Unchanged } else { EditOutcome::Changed }
        }
        TaskEdit::Reorder { order } => {
            let reordered = reorder_open_tasks(tasks, &order);
            if reordered == *tasks {
                return EditOutcome::Unchanged;
            }
            *tasks = reordered;
            EditOutcome::Changed
        }
    }
}

/// Puts open tasks in `order`, then appends done tasks.
///
/// Unknown and repeated ids are ignored; open tasks missing from `order`
/// keep their relative order after the listed ones.
fn reorder_open_tasks(tasks: &[TaskItem], order: &[String]) -> Vec<TaskItem> {
    let (mut open, done): (Vec<&TaskItem>, Vec<&TaskItem>) = tasks.iter().partition(|t| !t.done);
    let mut result = Vec::with_capacity(tasks.len());

    for id in order {
        if let Some(index) = open.iter().position(|t| &t.id == id) {
            result.push(open.remove(index).clone());
        }
    }
    result.extend(open.into_iter().cloned());
    result.extend(done.into_iter().cloned());
    result
}
