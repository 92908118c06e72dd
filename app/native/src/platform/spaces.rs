//! Desktop (Space) enumeration through the private CoreGraphics server API.
//!
#![allow(clippy::doc_markdown)] // Allow CoreGraphics, CGS, etc. without backticks
//!
//! `CGSCopyManagedDisplaySpaces` returns one dictionary per display:
//!
//! ```text
//! [{ "Current Space": { "id64": 42, "type": 0 },
//!    "Spaces": [{ "id64": 41, "type": 0 }, { "id64": 42, "type": 0 }, ...] }, ...]
//! ```
//!
//! `type` 0 is an ordinary desktop; full-screen app spaces use other values.
//! Parsing happens once per query into plain Rust values; everything after
//! that (positions, switch distances) is pure and unit tested.

use std::ffi::c_void;
use std::sync::OnceLock;

use core_foundation::array::{CFArray, CFArrayRef};
use core_foundation::base::{CFType, TCFType};
use core_foundation::dictionary::CFDictionary;
use core_foundation::number::CFNumber;
use core_foundation::string::CFString;

// ============================================================================
// FFI Declarations
// ============================================================================

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    /// Returns the main connection ID to the window server.
    fn CGSMainConnectionID() -> i32;

    /// Copies the per-display space layout. The caller owns the result.
    fn CGSCopyManagedDisplaySpaces(connection: i32) -> CFArrayRef;
}

const SPACE_TYPE_NORMAL: i64 = 0;

// ============================================================================
// Types
// ============================================================================

/// One space as reported by the window server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Space {
    pub id: i64,
    /// Raw `type` value, `None` when the key was missing.
    pub kind: Option<i64>,
}

impl Space {
    #[must_use]
    pub const fn normal(id: i64) -> Self {
        Self {
            id,
            kind: Some(SPACE_TYPE_NORMAL),
        }
    }

    #[must_use]
    pub const fn fullscreen(id: i64) -> Self { Self { id, kind: Some(4) } }

    #[must_use]
    pub const fn is_normal(&self) -> bool { matches!(self.kind, Some(SPACE_TYPE_NORMAL)) }
}

/// Spaces of one display, in Mission Control order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplaySpaces {
    pub current: Option<Space>,
    pub spaces: Vec<Space>,
}

/// A normal desktop with its display and global position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesktopEntry {
    pub id: i64,
    pub display_index: usize,
    /// Zero-based position across all displays.
    pub position: u32,
}

// ============================================================================
// Queries
// ============================================================================

static CONNECTION_ID: OnceLock<i32> = OnceLock::new();

fn connection_id() -> Option<i32> {
    let id = *CONNECTION_ID.get_or_init(|| unsafe { CGSMainConnectionID() });
    (id != 0).then_some(id)
}

/// Reads the current space layout of every display.
///
/// Returns `None` when the window server cannot be reached.
#[must_use]
pub fn managed_display_spaces() -> Option<Vec<DisplaySpaces>> {
    let connection = connection_id()?;
    let raw = unsafe { CGSCopyManagedDisplaySpaces(connection) };
    if raw.is_null() {
        return None;
    }
    let displays: CFArray = unsafe { CFArray::wrap_under_create_rule(raw) };
    let keys = Keys::new();

    Some(
        displays
            .iter()
            .filter_map(|item| as_dictionary(*item))
            .map(|display| read_display(&display, &keys))
            .collect(),
    )
}

struct Keys {
    current_space: CFString,
    spaces: CFString,
    id: CFString,
    kind: CFString,
}

impl Keys {
    fn new() -> Self {
        Self {
            current_space: CFString::from_static_string("Current Space"),
            spaces: CFString::from_static_string("Spaces"),
            id: CFString::from_static_string("id64"),
            kind: CFString::from_static_string("type"),
        }
    }
}

fn as_dictionary(raw: *const c_void) -> Option<CFDictionary> {
    if raw.is_null() {
        return None;
    }
    Some(unsafe { CFDictionary::wrap_under_get_rule(raw.cast()) })
}

fn lookup(dict: &CFDictionary, key: &CFString) -> Option<*const c_void> {
    dict.find(key.as_concrete_TypeRef().cast::<c_void>())
        .map(|value| *value)
        .filter(|value| !value.is_null())
}

fn number(dict: &CFDictionary, key: &CFString) -> Option<i64> {
    let raw = lookup(dict, key)?;
    let value = unsafe { CFType::wrap_under_get_rule(raw) };
    value.downcast::<CFNumber>()?.to_i64()
}

fn read_space(space: &CFDictionary, keys: &Keys) -> Option<Space> {
    Some(Space {
        id: number(space, &keys.id)?,
        kind: number(space, &keys.kind),
    })
}

fn read_display(display: &CFDictionary, keys: &Keys) -> DisplaySpaces {
    let current = lookup(display, &keys.current_space)
        .and_then(as_dictionary)
        .and_then(|space| read_space(&space, keys));

    let spaces = lookup(display, &keys.spaces)
        .map(|raw| unsafe { CFArray::<*const c_void>::wrap_under_get_rule(raw.cast()) })
        .map(|list| {
            list.iter()
                .filter_map(|item| as_dictionary(*item))
                .filter_map(|space| read_space(&space, keys))
                .collect()
        })
        .unwrap_or_default();

    DisplaySpaces { current, spaces }
}

// ============================================================================
// Layout helpers
// ============================================================================

/// Every normal desktop, numbered across displays in display order.
#[must_use]
pub fn normal_desktops(displays: &[DisplaySpaces]) -> Vec<DesktopEntry> {
    displays
        .iter()
        .enumerate()
        .flat_map(|(display_index, display)| {
            display.spaces.iter().filter(|s| s.is_normal()).map(move |s| (display_index, s.id))
        })
        .zip(0u32..)
        .map(|((display_index, id), position)| DesktopEntry {
            id,
            display_index,
            position,
        })
        .collect()
}

/// The space shown on `display_index`.
///
/// An index past the last display falls back to the first display.
#[must_use]
pub fn current_space(displays: &[DisplaySpaces], display_index: usize) -> Option<Space> {
    displays.get(display_index).or_else(|| displays.first())?.current
}

/// Global position of a desktop, `None` for full-screen or unknown spaces.
#[must_use]
pub fn position_of(desktops: &[DesktopEntry], id: i64) -> Option<u32> {
    desktops.iter().find(|d| d.id == id).map(|d| d.position)
}

/// Signed number of one-desktop moves from `current` to `target` on one display.
///
/// `None` when either space is not a normal desktop of that display.
#[must_use]
pub fn switch_steps(desktops: &[DesktopEntry], display_index: usize, current: i64, target: i64) -> Option<i32> {
    let local: Vec<i64> = desktops
        .iter()
        .filter(|d| d.display_index == display_index)
        .map(|d| d.id)
        .collect();
    let from = i32::try_from(local.iter().position(|&id| id == current)?).ok()?;
    let to = i32::try_from(local.iter().position(|&id| id == target)?).ok()?;
    Some(to - from)
}
