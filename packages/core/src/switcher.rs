//! Detection of the active desktop on the widget's display.
//!
//! Each tick asks the OS which desktop the bound display shows. The first
//! answer after the view becomes visible always loads that desktop; later
//! answers only matter when the id changes, in which case the outgoing
//! desktop is flushed before the incoming one is loaded. A failed query
//! keeps everything as it was.
//!
//! The switcher runs under the session lock, so a switch always finishes
//! its flush and load before another tick or command can start one.

use crate::bridge::DesktopBridge;
use crate::error::{BridgeError, BridgeResult};
use crate::types::{ActiveWorkspace, WorkspaceId};
use crate::workspace::WorkspaceCache;

/// Result of one poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The OS query failed; nothing changed.
    Unavailable,
    Unchanged,
    /// First poll after becoming visible.
    Loaded(WorkspaceId),
    Switched { from: WorkspaceId, to: WorkspaceId },
}

#[derive(Debug)]
pub struct WorkspaceSwitcher {
    display_index: usize,
    current: Option<ActiveWorkspace>,
    primed: bool,
}

impl WorkspaceSwitcher {
    #[must_use]
    pub const fn new(display_index: usize) -> Self {
        Self {
            display_index,
            current: None,
            primed: false,
        }
    }

    #[must_use]
    pub const fn display_index(&self) -> usize { self.display_index }

    #[must_use]
    pub const fn current(&self) -> Option<&ActiveWorkspace> { self.current.as_ref() }

    /// Makes the next poll load unconditionally.
    pub const fn reset(&mut self) { self.primed = false; }

    pub fn poll<D: DesktopBridge + ?Sized>(
        &mut self,
        bridge: &D,
        cache: &mut WorkspaceCache,
    ) -> SwitchOutcome {
        let reported = match bridge.active_workspace(self.display_index) {
            Ok(workspace) => workspace,
            Err(e) => {
                tracing::debug!("switcher: active workspace unavailable: {e}");
                return SwitchOutcome::Unavailable;
            }
        };
        let next = reported.workspace_id;
        let previous = self.current.as_ref().map(|w| w.workspace_id);

        let outcome = if !self.primed {
            if let Some(old) = cache.active_id()
                && old != next
            {
                cache.flush(bridge, old);
            }
            cache.activate(bridge, next);
            self.primed = true;
            SwitchOutcome::Loaded(next)
        } else if previous == Some(next) {
            SwitchOutcome::Unchanged
        } else {
            cache.flush_and_switch(bridge, previous, next);
            match previous {
                Some(from) => {
                    tracing::debug!("switcher: workspace {from} -> {next}");
                    SwitchOutcome::Switched { from, to: next }
                }
                None => SwitchOutcome::Loaded(next),
            }
        };

        self.current = Some(reported);
        outcome
    }

    /// Asks the OS to show `target` on this display.
    ///
    /// Returns `Ok(false)` when `target` is already active.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::PermissionDenied` when switching is not permitted,
    /// or the bridge's error if the request fails.
    pub fn request_switch<D: DesktopBridge + ?Sized>(
        &self,
        bridge: &D,
        target: WorkspaceId,
    ) -> BridgeResult<bool> {
        if !bridge.switching_permitted() {
            return Err(BridgeError::PermissionDenied(
                "accessibility access is required to switch desktops".to_string(),
            ));
        }
        if self.current.as_ref().is_some_and(|w| w.workspace_id == target) {
            return Ok(false);
        }
        bridge.switch_workspace(self.display_index, target)
    }
}
