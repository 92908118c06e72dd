//! Collapsed/expanded sizing of the widget.
//!
//! Collapsed is a fixed strip. Expanded is the header plus every visible
//! panel, so hiding a panel shrinks the expanded widget. Heights here are
//! logical pixels; the session converts with the monitor's scale factor.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::geometry::{MonitorBounds, Position, WindowSize};

/// Optional sections of the expanded widget.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum PanelKind {
    Tasks,
    Timer,
    CommonApps,
    Desktops,
}

impl PanelKind {
    pub const ALL: [Self; 4] = [Self::Tasks, Self::Timer, Self::CommonApps, Self::Desktops];
}

/// Fixed dimensions of the widget, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelLayout {
    pub width: u32,
    pub collapsed_height: u32,
    pub header_height: u32,
    pub tasks: u32,
    pub timer: u32,
    pub common_apps: u32,
    pub desktops: u32,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            width: 290,
            collapsed_height: 56,
            header_height: 56,
            tasks: 164,
            timer: 72,
            common_apps: 64,
            desktops: 96,
        }
    }
}

impl PanelLayout {
    #[must_use]
    pub const fn panel_height(&self, panel: PanelKind) -> u32 {
        match panel {
            PanelKind::Tasks => self.tasks,
            PanelKind::Timer => self.timer,
            PanelKind::CommonApps => self.common_apps,
            PanelKind::Desktops => self.desktops,
        }
    }

    /// Logical height with every panel shown.
    #[must_use]
    pub fn full_height(&self) -> u32 {
        PanelKind::ALL.into_iter().map(|p| self.panel_height(p)).sum::<u32>() + self.header_height
    }
}

#[derive(Debug)]
pub struct CollapseController {
    layout: PanelLayout,
    collapsed: bool,
    hidden: BTreeSet<PanelKind>,
    /// Physical height of a resize we issued that may not have landed yet.
    pending_resize: Option<(u32, Instant)>,
    settle: Duration,
}

impl CollapseController {
    pub fn new(layout: PanelLayout, hidden: impl IntoIterator<Item = PanelKind>, settle: Duration) -> Self {
        Self {
            layout,
            collapsed: false,
            hidden: hidden.into_iter().collect(),
            pending_resize: None,
            settle,
        }
    }

    #[must_use]
    pub const fn is_collapsed(&self) -> bool { self.collapsed }

    #[must_use]
    pub fn is_visible(&self, panel: PanelKind) -> bool { !self.hidden.contains(&panel) }

    #[must_use]
    pub fn hidden_panels(&self) -> Vec<PanelKind> { self.hidden.iter().copied().collect() }

    /// Header plus the heights of all visible panels.
    #[must_use]
    pub fn expanded_height(&self) -> u32 {
        PanelKind::ALL
            .into_iter()
            .filter(|p| self.is_visible(*p))
            .map(|p| self.layout.panel_height(p))
            .sum::<u32>()
            + self.layout.header_height
    }

    /// Logical height for the current mode.
    #[must_use]
    pub fn target_height(&self) -> u32 {
        if self.collapsed { self.layout.collapsed_height } else { self.expanded_height() }
    }

    /// Physical size for the current mode on a monitor with `scale_factor`.
    #[must_use]
    pub fn target_size(&self, scale_factor: f64) -> WindowSize {
        WindowSize::new(
            to_physical(self.layout.width, scale_factor),
            to_physical(self.target_height(), scale_factor),
        )
    }

    /// Flips the mode. Returns `true` if now collapsed.
    pub const fn toggle(&mut self) -> bool {
        self.collapsed = !self.collapsed;
        self.collapsed
    }

    /// Records a resize the system is about to issue.
    pub fn record_resize(&mut self, size: WindowSize, now: Instant) {
        self.pending_resize = Some((size.height, now + self.settle));
    }

    /// Updates the mode from an observed window height without resizing.
    ///
    /// Heights below the midpoint between collapsed and expanded count as
    /// collapsed. Skipped while our own resize is still landing. Returns
    /// `true` if the mode changed.
    pub fn reclassify(&mut self, physical_height: u32, scale_factor: f64, now: Instant) -> bool {
        if let Some((target, until)) = self.pending_resize {
            if physical_height != target && now < until {
                return false;
            }
            self.pending_resize = None;
        }

        let collapsed_height = f64::from(self.layout.collapsed_height);
        let expanded_height = f64::from(self.expanded_height());
        if expanded_height <= collapsed_height || scale_factor <= 0.0 {
            return false;
        }

        let logical = f64::from(physical_height) / scale_factor;
        let collapsed = logical < f64::midpoint(collapsed_height, expanded_height);
        if collapsed == self.collapsed {
            return false;
        }

        tracing::debug!("collapse: window resized externally, collapsed={collapsed}");
        self.collapsed = collapsed;
        true
    }

    /// Shows or hides a panel.
    ///
    /// Returns `true` if the window should be resized to fit, which is only
    /// the case when visibility changed while expanded.
    pub fn set_panel_visible(&mut self, panel: PanelKind, visible: bool) -> bool {
        let changed = if visible { self.hidden.remove(&panel) } else { self.hidden.insert(panel) };
        changed && !self.collapsed
    }
}

/// Position that keeps a window's visual anchor when its height changes.
///
/// Windows in the lower half of the monitor grow upwards and shrink
/// downwards; returns `None` when no move is needed.
#[must_use]
pub fn compensated_position(
    position: Position,
    old: WindowSize,
    new: WindowSize,
    monitor: &MonitorBounds,
) -> Option<Position> {
    let mid_y = f64::from(position.y) + f64::from(old.height) / 2.0;
    if mid_y <= monitor.mid_y() || old.height == new.height {
        return None;
    }

    let delta = i64::from(old.height) - i64::from(new.height);
    let y = i32::try_from(i64::from(position.y) + delta).ok()?;
    Some(Position::new(position.x, y))
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_physical(logical: u32, scale_factor: f64) -> u32 {
    (f64::from(logical) * scale_factor).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const SETTLE: Duration = Duration::from_millis(600);
    const MONITOR: MonitorBounds = MonitorBounds {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
        scale_factor: 1.0,
    };

    fn controller() -> CollapseController {
        CollapseController::new(PanelLayout::default(), Vec::new(), SETTLE)
    }

    #[test]
    fn test_expanded_height_sums_visible_panels() {
        let mut collapse = controller();
        assert_eq!(collapse.expanded_height(), 56 + 164 + 72 + 64 + 96);

        collapse.set_panel_visible(PanelKind::Timer, false);
        collapse.set_panel_visible(PanelKind::Desktops, false);
        assert_eq!(collapse.expanded_height(), 56 + 164 + 64);
        assert_eq!(PanelLayout::default().full_height(), 452);
    }

    #[test]
    fn test_toggle_switches_target_height() {
        let mut collapse = controller();
        assert!(collapse.toggle());
        assert_eq!(collapse.target_height(), 56);
        assert!(!collapse.toggle());
        assert_eq!(collapse.target_height(), collapse.expanded_height());
    }

    #[test]
    fn test_target_size_scales_to_physical() {
        let mut collapse = controller();
        collapse.toggle();
        assert_eq!(collapse.target_size(2.0), WindowSize::new(580, 112));
    }

    #[test]
    fn test_panel_change_resizes_only_when_expanded() {
        let mut collapse = controller();
        assert!(collapse.set_panel_visible(PanelKind::Timer, false));
        // No change, no resize.
        assert!(!collapse.set_panel_visible(PanelKind::Timer, false));

        collapse.toggle();
        assert!(!collapse.set_panel_visible(PanelKind::Timer, true));
        assert!(collapse.is_visible(PanelKind::Timer));
    }

    #[test]
    fn test_reclassify_uses_midpoint() {
        let layout = PanelLayout {
            tasks: 164,
            timer: 0,
            common_apps: 0,
            desktops: 0,
            ..PanelLayout::default()
        };
        // Collapsed 56, expanded 220, midpoint 138.
        let mut collapse = CollapseController::new(layout, Vec::new(), SETTLE);
        let now = Instant::now();

        assert!(!collapse.reclassify(140, 1.0, now));
        assert!(collapse.reclassify(137, 1.0, now));
        assert!(collapse.is_collapsed());
        // Physical heights are divided by the scale factor.
        assert!(collapse.reclassify(280, 2.0, now));
        assert!(!collapse.is_collapsed());
    }

    #[test]
    fn test_reclassify_waits_for_own_resize() {
        let mut collapse = controller();
        let now = Instant::now();

        collapse.toggle();
        collapse.record_resize(collapse.target_size(1.0), now);
        // Still the old expanded height: our resize has not landed yet.
        assert!(!collapse.reclassify(452, 1.0, now + Duration::from_millis(200)));
        assert!(collapse.is_collapsed());

        assert!(!collapse.reclassify(56, 1.0, now + Duration::from_millis(400)));
        assert!(collapse.is_collapsed());
    }

    #[test]
    fn test_compensation_in_bottom_half() {
        let old = WindowSize::new(290, 220);
        let new = WindowSize::new(290, 56);

        let bottom = Position::new(100, 844);
        assert_eq!(compensated_position(bottom, old, new, &MONITOR), Some(Position::new(100, 1008)));
        // And back.
        assert_eq!(
            compensated_position(Position::new(100, 1008), new, old, &MONITOR),
            Some(bottom)
        );
    }

    #[test]
    fn test_no_compensation_in_top_half() {
        let old = WindowSize::new(290, 220);
        let new = WindowSize::new(290, 56);
        assert_eq!(compensated_position(Position::new(100, 25), old, new, &MONITOR), None);
    }
}
