//! Anchored/free tracking and auto-snap for one widget window.
//!
//! The controller is a sampler: each tick it is shown the window's current
//! frame and decides what, if anything, should happen. It never moves the
//! window itself; the session carries out the returned `DriftAction`.
//!
//! Telling our own moves apart from the user's drags works with a pending
//! move marker instead of a fixed tick count. Right before the session moves
//! the window it records the target; until the window is observed at that
//! target (or the settle time runs out) no drag detection happens. If the
//! settle time runs out with the window somewhere else, the OS adjusted our
//! move and the observed position becomes the new reference.

use std::time::{Duration, Instant};

use crate::geometry::{
    Anchor, AnchorMode, MonitorBounds, Position, SnapInsets, WindowSize, compute_position_with,
    window_center,
};

/// One observation of the widget window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSample {
    pub position: Position,
    pub size: WindowSize,
    /// The monitor the widget is assigned to.
    pub monitor: MonitorBounds,
}

/// What the session should do after a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftAction {
    Idle,
    /// Move the window to this position.
    Resnap(Position),
    /// The user dragged the window; the mode is now `Free` and should be persisted.
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingMove {
    target: Position,
    until: Instant,
}

#[derive(Debug)]
pub struct DriftController {
    mode: AnchorMode,
    /// Anchor to return to on "snap back", kept while `Free`.
    last_anchor: Anchor,
    last_set: Option<Position>,
    pending: Option<PendingMove>,
    off_monitor: bool,
    settle: Duration,
    insets: SnapInsets,
}

impl DriftController {
    #[must_use]
    pub fn new(mode: AnchorMode, fallback_anchor: Anchor, settle: Duration, insets: SnapInsets) -> Self {
        Self {
            mode,
            last_anchor: mode.anchor().unwrap_or(fallback_anchor),
            last_set: None,
            pending: None,
            off_monitor: false,
            settle,
            insets,
        }
    }

    #[must_use]
    pub const fn mode(&self) -> AnchorMode { self.mode }

    #[must_use]
    pub const fn last_anchor(&self) -> Anchor { self.last_anchor }

    #[must_use]
    pub const fn off_monitor(&self) -> bool { self.off_monitor }

    #[must_use]
    pub const fn last_set(&self) -> Option<Position> { self.last_set }

    #[must_use]
    pub fn move_in_flight(&self) -> bool { self.pending.is_some() }

    /// Forces `Anchored(anchor)`. The caller snaps right after.
    pub const fn select_anchor(&mut self, anchor: Anchor) {
        self.mode = AnchorMode::Anchored(anchor);
        self.last_anchor = anchor;
    }

    /// Snap target for the current anchor, or for the last anchor while free.
    #[must_use]
    pub fn target(&self, monitor: &MonitorBounds, size: WindowSize) -> Position {
        let anchor = self.mode.anchor().unwrap_or(self.last_anchor);
        compute_position_with(anchor, monitor, size, self.insets)
    }

    /// Records a move the system is about to issue.
    ///
    /// Must be called before the move so the next samples are not read as a drag.
    pub fn record_programmatic_move(&mut self, target: Position, now: Instant) {
        self.last_set = Some(target);
        self.pending = Some(PendingMove {
            target,
            until: now + self.settle,
        });
    }

    /// Forgets the reference position, e.g. when the view was hidden.
    pub const fn reset_tracking(&mut self) {
        self.last_set = None;
        self.pending = None;
    }

    /// Classifies one sample.
    pub fn observe(&mut self, sample: &WindowSample, now: Instant) -> DriftAction {
        let (cx, cy) = window_center(sample.position, sample.size);
        self.off_monitor = !sample.monitor.contains_point(cx, cy);

        if let Some(pending) = self.pending {
            if sample.position == pending.target {
                self.pending = None;
            } else if now >= pending.until {
                tracing::debug!(
                    "drift: move to {:?} landed at {:?}, adopting it",
                    pending.target,
                    sample.position
                );
                self.pending = None;
                self.last_set = Some(sample.position);
                return DriftAction::Idle;
            } else {
                return DriftAction::Idle;
            }
        }

        let AnchorMode::Anchored(anchor) = self.mode else {
            return DriftAction::Idle;
        };
        let target = compute_position_with(anchor, &sample.monitor, sample.size, self.insets);

        if self.off_monitor {
            return DriftAction::Resnap(target);
        }

        match self.last_set {
            None if sample.position == target => {
                self.last_set = Some(target);
                DriftAction::Idle
            }
            None => DriftAction::Resnap(target),
            Some(last) if last != sample.position => {
                tracing::info!("drift: window moved by user, detaching from {anchor}");
                self.mode = AnchorMode::Free;
                DriftAction::Detached
            }
            Some(_) => DriftAction::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MONITOR: MonitorBounds = MonitorBounds {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
        scale_factor: 1.0,
    };
    const SIZE: WindowSize = WindowSize::new(290, 220);
    const SETTLE: Duration = Duration::from_millis(600);

    fn controller(mode: AnchorMode) -> DriftController {
        DriftController::new(mode, Anchor::TopRight, SETTLE, SnapInsets::default())
    }

    fn sample(x: i32, y: i32) -> WindowSample {
        WindowSample {
            position: Position::new(x, y),
            size: SIZE,
            monitor: MONITOR,
        }
    }

    // Top-right on MONITOR with SIZE.
    const TOP_RIGHT: Position = Position::new(1614, 25);

    #[test]
    fn test_first_sample_snaps_anchored_window() {
        let mut drift = controller(AnchorMode::Anchored(Anchor::TopRight));
        let action = drift.observe(&sample(10, 10), Instant::now());
        assert_eq!(action, DriftAction::Resnap(TOP_RIGHT));
    }

    #[test]
    fn test_first_sample_at_target_is_idle() {
        let mut drift = controller(AnchorMode::Anchored(Anchor::TopRight));
        let action = drift.observe(&sample(TOP_RIGHT.x, TOP_RIGHT.y), Instant::now());
        assert_eq!(action, DriftAction::Idle);
        assert_eq!(drift.last_set(), Some(TOP_RIGHT));
    }

    #[test]
    fn test_programmatic_move_is_not_a_drag() {
        let mut drift = controller(AnchorMode::Anchored(Anchor::TopRight));
        let now = Instant::now();

        drift.record_programmatic_move(TOP_RIGHT, now);
        // The OS has not applied the move yet on the next tick.
        assert_eq!(drift.observe(&sample(10, 10), now + Duration::from_millis(200)), DriftAction::Idle);
        // Now it has.
        let later = now + Duration::from_millis(400);
        assert_eq!(drift.observe(&sample(TOP_RIGHT.x, TOP_RIGHT.y), later), DriftAction::Idle);
        assert!(!drift.move_in_flight());
        assert_eq!(drift.mode(), AnchorMode::Anchored(Anchor::TopRight));
    }

    #[test]
    fn test_user_drag_detaches() {
        let mut drift = controller(AnchorMode::Anchored(Anchor::TopRight));
        let now = Instant::now();
        drift.record_programmatic_move(TOP_RIGHT, now);
        drift.observe(&sample(TOP_RIGHT.x, TOP_RIGHT.y), now);

        let action = drift.observe(&sample(800, 400), now + Duration::from_millis(200));
        assert_eq!(action, DriftAction::Detached);
        assert_eq!(drift.mode(), AnchorMode::Free);
        assert_eq!(drift.last_anchor(), Anchor::TopRight);
    }

    #[test]
    fn test_free_mode_never_resnaps() {
        let mut drift = controller(AnchorMode::Free);
        let now = Instant::now();

        assert_eq!(drift.observe(&sample(800, 400), now), DriftAction::Idle);
        // Off-monitor only raises the flag.
        assert_eq!(drift.observe(&sample(5000, 400), now), DriftAction::Idle);
        assert!(drift.off_monitor());
    }

    #[test]
    fn test_anchored_off_monitor_resnaps_without_state_change() {
        let mut drift = controller(AnchorMode::Anchored(Anchor::TopRight));
        let now = Instant::now();
        drift.record_programmatic_move(TOP_RIGHT, now);
        drift.observe(&sample(TOP_RIGHT.x, TOP_RIGHT.y), now);

        let action = drift.observe(&sample(-1000, 400), now);
        assert_eq!(action, DriftAction::Resnap(TOP_RIGHT));
        assert!(drift.off_monitor());
        assert_eq!(drift.mode(), AnchorMode::Anchored(Anchor::TopRight));
    }

    #[test]
    fn test_off_monitor_uses_window_center() {
        let mut drift = controller(AnchorMode::Free);
        // Left edge off screen, center still on it.
        drift.observe(&sample(-100, 400), Instant::now());
        assert!(!drift.off_monitor());
        // Center just past the right edge.
        drift.observe(&sample(1920 - 145, 400), Instant::now());
        assert!(drift.off_monitor());
    }

    #[test]
    fn test_expired_move_adopts_observed_position() {
        let mut drift = controller(AnchorMode::Anchored(Anchor::TopRight));
        let now = Instant::now();
        drift.record_programmatic_move(TOP_RIGHT, now);

        // The OS placed the window a few pixels lower than asked.
        let adjusted = sample(TOP_RIGHT.x, TOP_RIGHT.y + 6);
        assert_eq!(drift.observe(&adjusted, now + SETTLE), DriftAction::Idle);
        assert_eq!(drift.last_set(), Some(adjusted.position));
        assert_eq!(drift.observe(&adjusted, now + SETTLE * 2), DriftAction::Idle);
        assert_eq!(drift.mode(), AnchorMode::Anchored(Anchor::TopRight));
    }

    #[test]
    fn test_select_anchor_reanchors_free_window() {
        let mut drift = controller(AnchorMode::Free);
        drift.select_anchor(Anchor::BottomLeft);

        assert_eq!(drift.mode(), AnchorMode::Anchored(Anchor::BottomLeft));
        assert_eq!(drift.target(&MONITOR, SIZE), Position::new(16, 844));
    }

    #[test]
    fn test_target_while_free_uses_last_anchor() {
        let drift = controller(AnchorMode::Free);
        assert_eq!(drift.target(&MONITOR, SIZE), TOP_RIGHT);
    }

    #[test]
    fn test_target_is_idempotent() {
        let drift = controller(AnchorMode::Anchored(Anchor::MiddleCenter));
        assert_eq!(drift.target(&MONITOR, SIZE), drift.target(&MONITOR, SIZE));
    }
}
