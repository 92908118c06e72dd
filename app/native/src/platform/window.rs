//! `AppKit` tweaks for the floating widget windows.

use core_graphics::display::CGDisplay;
use objc::{msg_send, sel, sel_impl};
use tauri::WebviewWindow;

type ObjcId = *mut objc::runtime::Object;

const NS_WINDOW_COLLECTION_BEHAVIOR_CAN_JOIN_ALL_SPACES: u64 = 1 << 0;
const NS_WINDOW_COLLECTION_BEHAVIOR_STATIONARY: u64 = 1 << 4;

/// `kCGFloatingWindowLevelKey`.
const FLOATING_WINDOW_LEVEL_KEY: i32 = 5;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGWindowLevelForKey(key: i32) -> i32;
}

fn ns_window(window: &WebviewWindow) -> Option<ObjcId> {
    window.ns_window().ok().map(|ptr| ptr.cast()).filter(|ptr: &ObjcId| !ptr.is_null())
}

/// Sets the window level from a `CGWindowLevelKey`.
pub fn set_window_level(window: &WebviewWindow, key: i32) {
    if let Some(ns_win) = ns_window(window) {
        unsafe {
            let level = CGWindowLevelForKey(key);
            let _: () = msg_send![ns_win, setLevel: i64::from(level)];
        }
    }
}

/// Makes a widget window float above normal windows on every desktop.
///
/// Mission Control leaves stationary windows in place, so the widget does not
/// slide along with the desktop during a switch.
pub fn make_floating_widget(window: &WebviewWindow) {
    let _ = window.set_always_on_top(true);
    let _ = window.set_visible_on_all_workspaces(true);
    let _ = window.set_skip_taskbar(true);
    set_window_level(window, FLOATING_WINDOW_LEVEL_KEY);

    if let Some(ns_win) = ns_window(window) {
        unsafe {
            let behaviors = NS_WINDOW_COLLECTION_BEHAVIOR_CAN_JOIN_ALL_SPACES
                | NS_WINDOW_COLLECTION_BEHAVIOR_STATIONARY;
            let _: () = msg_send![ns_win, setCollectionBehavior: behaviors];
            let _: () = msg_send![ns_win, setHidesOnDeactivate: false];
        }
    }
}

/// Number of active displays, at least 1.
#[must_use]
pub fn active_display_count() -> usize { CGDisplay::active_displays().map_or(1, |ids| ids.len().max(1)) }
