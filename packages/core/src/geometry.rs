//! Snap position calculation for anchored widgets.
//!
//! All coordinates are physical pixels in the global desktop space. Logical
//! insets (padding, menu bar height) are scaled by the monitor's scale factor
//! before use, so the same anchor lands in the same visual spot on a retina
//! panel and on a 1x external display.

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Gap between the widget and the monitor edge, in logical pixels.
pub const DEFAULT_PADDING: f64 = 16.0;

/// Height reserved for the system menu bar, in logical pixels.
pub const DEFAULT_MENU_BAR_INSET: f64 = 25.0;

// ============================================================================
// Anchors
// ============================================================================

/// One of the nine snap positions on a monitor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    #[default]
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Horizontal {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Vertical {
    Top,
    Middle,
    Bottom,
}

impl Anchor {
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::MiddleCenter,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Returns the wire name, e.g. `"top-right"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::MiddleCenter => "middle-center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }

    const fn horizontal(self) -> Horizontal {
        match self {
            Self::TopLeft | Self::MiddleLeft | Self::BottomLeft => Horizontal::Left,
            Self::TopCenter | Self::MiddleCenter | Self::BottomCenter => Horizontal::Center,
            Self::TopRight | Self::MiddleRight | Self::BottomRight => Horizontal::Right,
        }
    }

    const fn vertical(self) -> Vertical {
        match self {
            Self::TopLeft | Self::TopCenter | Self::TopRight => Vertical::Top,
            Self::MiddleLeft | Self::MiddleCenter | Self::MiddleRight => Vertical::Middle,
            Self::BottomLeft | Self::BottomCenter | Self::BottomRight => Vertical::Bottom,
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Error returned when parsing an unknown anchor or mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown anchor: {0}")]
pub struct ParseAnchorError(pub String);

impl FromStr for Anchor {
    type Err = ParseAnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|anchor| anchor.as_str() == s)
            .ok_or_else(|| ParseAnchorError(s.to_string()))
    }
}

/// Whether the widget follows an anchor or stays where the user dropped it.
///
/// Serialized as the anchor name, or `"free"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AnchorMode {
    Anchored(Anchor),
    Free,
}

impl Default for AnchorMode {
    fn default() -> Self { Self::Anchored(Anchor::default()) }
}

impl AnchorMode {
    #[must_use]
    pub const fn anchor(self) -> Option<Anchor> {
        match self {
            Self::Anchored(anchor) => Some(anchor),
            Self::Free => None,
        }
    }

    #[must_use]
    pub const fn is_free(self) -> bool { matches!(self, Self::Free) }
}

impl FromStr for AnchorMode {
    type Err = ParseAnchorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "free" {
            Ok(Self::Free)
        } else {
            s.parse().map(Self::Anchored)
        }
    }
}

impl TryFrom<String> for AnchorMode {
    type Error = ParseAnchorError;

    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<AnchorMode> for String {
    fn from(mode: AnchorMode) -> Self {
        match mode {
            AnchorMode::Anchored(anchor) => anchor.as_str().to_string(),
            AnchorMode::Free => "free".to_string(),
        }
    }
}

// ============================================================================
// Rectangles
// ============================================================================

/// A monitor's frame in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl MonitorBounds {
    /// Converts a logical length to whole physical pixels on this monitor.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn scale(&self, logical: f64) -> i64 { (logical * self.scale_factor).round() as i64 }

    /// Returns `true` if the point lies inside this monitor.
    ///
    /// The left and top edges are inclusive, the right and bottom edges are not.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let left = f64::from(self.x);
        let top = f64::from(self.y);
        x >= left
            && x < left + f64::from(self.width)
            && y >= top
            && y < top + f64::from(self.height)
    }

    /// Vertical midpoint in physical pixels.
    #[must_use]
    pub fn mid_y(&self) -> f64 { f64::from(self.y) + f64::from(self.height) / 2.0 }
}

/// A window size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl WindowSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self { Self { width, height } }
}

/// A window's top-left corner in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self { Self { x, y } }
}

/// Returns the center point of a window.
#[must_use]
pub fn window_center(position: Position, size: WindowSize) -> (f64, f64) {
    (
        f64::from(position.x) + f64::from(size.width) / 2.0,
        f64::from(position.y) + f64::from(size.height) / 2.0,
    )
}

// ============================================================================
// Snap calculation
// ============================================================================

/// Logical insets applied when snapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapInsets {
    /// Gap kept from the left, right and bottom edges.
    pub padding: f64,
    /// Gap kept from the top edge, clearing the menu bar.
    pub menu_bar_inset: f64,
}

impl Default for SnapInsets {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            menu_bar_inset: DEFAULT_MENU_BAR_INSET,
        }
    }
}

/// Computes where a window of `window` size sits when snapped to `anchor`.
#[must_use]
pub fn compute_position(anchor: Anchor, monitor: &MonitorBounds, window: WindowSize) -> Position {
    compute_position_with(anchor, monitor, window, SnapInsets::default())
}

/// Computes a snap position with explicit insets.
///
/// The result is clamped so the window stays inside the monitor. Below the
/// menu bar is preferred; when the window is too tall for that, it may
/// overlap the menu bar but never the monitor's top edge. A window larger
/// than the monitor on an axis is aligned to the monitor's top/left edge.
#[must_use]
pub fn compute_position_with(
    anchor: Anchor,
    monitor: &MonitorBounds,
    window: WindowSize,
    insets: SnapInsets,
) -> Position {
    let padding = monitor.scale(insets.padding);
    let menu_bar = monitor.scale(insets.menu_bar_inset);

    let (mx, my) = (i64::from(monitor.x), i64::from(monitor.y));
    let (mw, mh) = (i64::from(monitor.width), i64::from(monitor.height));
    let (ww, wh) = (i64::from(window.width), i64::from(window.height));

    let x = match anchor.horizontal() {
        Horizontal::Left => mx + padding,
        Horizontal::Center => mx + half_rounded(mw - ww),
        Horizontal::Right => mx + mw - ww - padding,
    };
    let y = match anchor.vertical() {
        Vertical::Top => my + menu_bar,
        Vertical::Middle => my + half_rounded(mh - wh),
        Vertical::Bottom => my + mh - wh - padding,
    };

    let max_x = mx + mw - ww;
    let x = if max_x >= mx { x.clamp(mx, max_x) } else { mx };

    let max_y = my + mh - wh;
    let min_y = my + menu_bar;
    let y = if max_y >= min_y { y.clamp(min_y, max_y) } else { max_y.max(my) };

    Position::new(saturate(x), saturate(y))
}

/// Halves `n`, rounding exact halves up.
const fn half_rounded(n: i64) -> i64 { (n + 1).div_euclid(2) }

fn saturate(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}
